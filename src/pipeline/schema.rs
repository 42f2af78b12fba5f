//! Structured-output contracts for the three pipeline stages.
//!
//! Every object forbids properties outside its declared set, every optional
//! leaf is a `["type","null"]` union rather than an omittable key, string
//! leaves carry length bounds, and date leaves are pattern-constrained to
//! `YYYY-MM-DD`. The completion service's constrained decoding and all
//! downstream validation depend on these contracts being exact.

use serde_json::{Value, json};

use crate::llm::JsonSchema;
use crate::pipeline::types::{
    Currency, DealStage, DeliverableType, EvidenceSource, LastActionNeededBy, PaymentStatus,
    Platform,
};

/// `YYYY-MM-DD` string or null. Dates are never free text.
fn iso_date_or_null() -> Value {
    json!({
        "type": ["string", "null"],
        "pattern": "^\\d{4}-\\d{2}-\\d{2}$",
    })
}

/// The evidence leaf: a bounded literal quote, its source, and a PDF page.
fn evidence() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "quote": { "type": "string", "minLength": 1, "maxLength": 240 },
            "source": { "type": "string", "enum": EvidenceSource::VALUES },
            "page": { "type": ["integer", "null"], "minimum": 1 },
        },
        "required": ["quote", "source", "page"],
    })
}

/// A nullable `{value, evidence}` wrapper around a leaf schema.
fn evidenced(value: Value) -> Value {
    json!({
        "type": ["object", "null"],
        "additionalProperties": false,
        "properties": {
            "value": value,
            "evidence": evidence(),
        },
        "required": ["value", "evidence"],
    })
}

fn bounded_string(max_length: u32) -> Value {
    json!({ "type": "string", "minLength": 1, "maxLength": max_length })
}

/// Stage-1 routing contract: deal or not, lifecycle stage, attachment hint.
pub fn routing_schema() -> JsonSchema {
    JsonSchema {
        name: "routing_v1",
        schema: json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "isDeal": { "type": "boolean" },
                "dealStage": { "type": "string", "enum": DealStage::VALUES },
                "shouldParseAttachments": { "type": "boolean" },
                "routingReason": { "type": ["string", "null"], "maxLength": 200 },
            },
            "required": ["isDeal", "dealStage", "shouldParseAttachments", "routingReason"],
        }),
    }
}

/// Stage-2 minimal contract: the inbox-card payload.
pub fn minimal_schema() -> JsonSchema {
    JsonSchema {
        name: "deal_minimal_extraction_v1",
        schema: json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "campaignName": evidenced(bounded_string(120)),
                "brandName": evidenced(bounded_string(120)),
                "lastActionNeededBy": evidenced(json!({
                    "type": "string", "enum": LastActionNeededBy::VALUES,
                })),
                "draftRequired": evidenced(json!({ "type": "boolean" })),

                "goLiveWindow": {
                    "type": ["object", "null"],
                    "additionalProperties": false,
                    "properties": {
                        "rawText": bounded_string(120),
                        "startDate": iso_date_or_null(),
                        "endDate": iso_date_or_null(),
                        "evidence": evidence(),
                    },
                    "required": ["rawText", "startDate", "endDate", "evidence"],
                },

                "payment": {
                    "type": ["object", "null"],
                    "additionalProperties": false,
                    "properties": {
                        "amount": { "type": ["number", "null"], "minimum": 0 },
                        "currency": { "type": "string", "enum": Currency::VALUES },
                        "paymentTerms": { "type": ["string", "null"], "maxLength": 60 },
                        "evidence": evidence(),
                    },
                    "required": ["amount", "currency", "paymentTerms", "evidence"],
                },

                "deliverablesSummary": evidenced(bounded_string(220)),
            },
            "required": [
                "campaignName",
                "brandName",
                "lastActionNeededBy",
                "draftRequired",
                "goLiveWindow",
                "payment",
                "deliverablesSummary",
            ],
        }),
    }
}

/// Stage-2 deep contract: contract-level terms and bounded lists.
pub fn deep_schema() -> JsonSchema {
    let payment_status_or_null: Vec<Value> = PaymentStatus::VALUES
        .iter()
        .map(|v| json!(v))
        .chain(std::iter::once(Value::Null))
        .collect();

    JsonSchema {
        name: "deal_deep_extraction_v1",
        schema: json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "exclusivityRightsSummary": evidenced(bounded_string(180)),
                "usageRightsSummary": evidenced(bounded_string(180)),

                "payment": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "amount": { "type": ["number", "null"], "minimum": 0 },
                        "currency": { "type": "string", "enum": Currency::VALUES },
                        "paymentTerms": { "type": ["string", "null"], "maxLength": 120 },
                        "paymentStatus": {
                            "type": ["string", "null"],
                            "enum": payment_status_or_null,
                        },
                        "invoiceSentAt": iso_date_or_null(),
                        "invoiceExpectedAt": iso_date_or_null(),
                        "evidence": evidence(),
                    },
                    "required": [
                        "amount",
                        "currency",
                        "paymentTerms",
                        "paymentStatus",
                        "invoiceSentAt",
                        "invoiceExpectedAt",
                        "evidence",
                    ],
                },

                "keyDates": {
                    "type": "array",
                    "maxItems": 30,
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "name": { "type": ["string", "null"], "maxLength": 80 },
                            "dateRawText": bounded_string(120),
                            "startDate": iso_date_or_null(),
                            "endDate": iso_date_or_null(),
                            "description": { "type": ["string", "null"], "maxLength": 160 },
                            "evidence": evidence(),
                        },
                        "required": [
                            "name",
                            "dateRawText",
                            "startDate",
                            "endDate",
                            "description",
                            "evidence",
                        ],
                    },
                },

                "requiredActions": action_list_schema(),
                "mustAvoids": action_list_schema(),

                "deliverables": {
                    "type": "array",
                    "maxItems": 50,
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "platform": { "type": "string", "enum": Platform::VALUES },
                            "type": { "type": "string", "enum": DeliverableType::VALUES },
                            "quantity": { "type": ["integer", "null"], "minimum": 1 },
                            "dueDate": iso_date_or_null(),
                            "dueDateRawText": { "type": ["string", "null"], "maxLength": 120 },
                            "description": { "type": ["string", "null"], "maxLength": 160 },
                            "evidence": evidence(),
                        },
                        "required": [
                            "platform",
                            "type",
                            "quantity",
                            "dueDate",
                            "dueDateRawText",
                            "description",
                            "evidence",
                        ],
                    },
                },
            },
            "required": [
                "exclusivityRightsSummary",
                "usageRightsSummary",
                "payment",
                "keyDates",
                "requiredActions",
                "mustAvoids",
                "deliverables",
            ],
        }),
    }
}

/// Obligations and prohibitions share the same item shape.
fn action_list_schema() -> Value {
    json!({
        "type": "array",
        "maxItems": 50,
        "items": {
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "name": bounded_string(80),
                "description": { "type": ["string", "null"], "maxLength": 160 },
                "evidence": evidence(),
            },
            "required": ["name", "description", "evidence"],
        },
    })
}
