//! Fixed schema mappers for the customer/account and order/opportunity pairs
//!
//! One pure function per (entity type, direction) pair. Mappers are total:
//! every target field is always present, missing source fields fall back to
//! documented defaults (empty string for text, `true` for active flags, `0`
//! for amounts, null for counterpart ids). Order status and opportunity
//! stage vocabularies translate through exhaustive lookup tables with a
//! defined fallback branch.

use serde_json::{json, Value};
use syncbridge_domain::{
    SyncDirection, SyncError, ENTITY_ACCOUNT, ENTITY_CUSTOMER, ENTITY_OPPORTUNITY,
    ENTITY_SALES_ORDER,
};

/// Dispatches payloads to the mapper for their (entity type, direction) pair
/// and answers routing questions about the counterpart schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformationEngine;

impl TransformationEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Map a source payload into the counterpart system's schema.
    ///
    /// `entity_type` names the SOURCE entity; an entity type with no mapper
    /// for the given direction is a validation failure.
    pub fn map(
        &self,
        entity_type: &str,
        direction: SyncDirection,
        payload: &Value,
    ) -> Result<Value, SyncError> {
        match (entity_type, direction) {
            (ENTITY_CUSTOMER, SyncDirection::ErpToCrm) => Ok(customer_to_account(payload)),
            (ENTITY_ACCOUNT, SyncDirection::CrmToErp) => Ok(account_to_customer(payload)),
            (ENTITY_SALES_ORDER, SyncDirection::ErpToCrm) => Ok(order_to_opportunity(payload)),
            (ENTITY_OPPORTUNITY, SyncDirection::CrmToErp) => Ok(opportunity_to_order(payload)),
            _ => Err(SyncError::ValidationFailure(format!(
                "no mapping for entity '{entity_type}' in direction {direction}"
            ))),
        }
    }

    /// Counterpart entity type for a source entity, direction-checked.
    pub fn target_entity_type(
        &self,
        entity_type: &str,
        direction: SyncDirection,
    ) -> Result<&'static str, SyncError> {
        match (entity_type, direction) {
            (ENTITY_CUSTOMER, SyncDirection::ErpToCrm) => Ok(ENTITY_ACCOUNT),
            (ENTITY_ACCOUNT, SyncDirection::CrmToErp) => Ok(ENTITY_CUSTOMER),
            (ENTITY_SALES_ORDER, SyncDirection::ErpToCrm) => Ok(ENTITY_OPPORTUNITY),
            (ENTITY_OPPORTUNITY, SyncDirection::CrmToErp) => Ok(ENTITY_SALES_ORDER),
            _ => Err(SyncError::ValidationFailure(format!(
                "no mapping for entity '{entity_type}' in direction {direction}"
            ))),
        }
    }

    /// Collection endpoint on the target system for a source entity.
    pub fn target_endpoint(
        &self,
        entity_type: &str,
        direction: SyncDirection,
    ) -> Result<&'static str, SyncError> {
        Ok(match self.target_entity_type(entity_type, direction)? {
            ENTITY_ACCOUNT => "accounts",
            ENTITY_CUSTOMER => "customers",
            ENTITY_OPPORTUNITY => "opportunities",
            _ => "salesOrders",
        })
    }
}

/// ERP customer -> CRM account.
#[must_use]
pub fn customer_to_account(source: &Value) -> Value {
    json!({
        "Id": field(source, "crmId"),
        "Name": text(source, "name"),
        "ERP_ID__c": text(source, "kundennummer"),
        "AccountNumber": text(source, "kontonummer"),
        "Email__c": text(source, "email"),
        "Phone": text(source, "telefon"),
        "BillingStreet": text(source, "strasse"),
        "BillingPostalCode": text(source, "plz"),
        "BillingCity": text(source, "ort"),
        "Active__c": flag(source, "aktiv"),
    })
}

/// CRM account -> ERP customer.
#[must_use]
pub fn account_to_customer(source: &Value) -> Value {
    json!({
        "crmId": field(source, "Id"),
        "name": text(source, "Name"),
        "kundennummer": text(source, "ERP_ID__c"),
        "kontonummer": text(source, "AccountNumber"),
        "email": text(source, "Email__c"),
        "telefon": text(source, "Phone"),
        "strasse": text(source, "BillingStreet"),
        "plz": text(source, "BillingPostalCode"),
        "ort": text(source, "BillingCity"),
        "aktiv": flag(source, "Active__c"),
    })
}

/// ERP sales order -> CRM opportunity.
#[must_use]
pub fn order_to_opportunity(source: &Value) -> Value {
    let status = source.get("status").and_then(Value::as_str).unwrap_or_default();
    json!({
        "Id": field(source, "crmId"),
        "Name": text(source, "betreff"),
        "ERP_Order__c": text(source, "auftragsnummer"),
        "AccountErpId__c": text(source, "kundennummer"),
        "StageName": stage_for_status(status),
        "Amount": amount(source, "nettobetrag"),
        "CloseDate": text(source, "lieferdatum"),
    })
}

/// CRM opportunity -> ERP sales order.
#[must_use]
pub fn opportunity_to_order(source: &Value) -> Value {
    let stage = source.get("StageName").and_then(Value::as_str).unwrap_or_default();
    json!({
        "crmId": field(source, "Id"),
        "betreff": text(source, "Name"),
        "auftragsnummer": text(source, "ERP_Order__c"),
        "kundennummer": text(source, "AccountErpId__c"),
        "status": status_for_stage(stage),
        "nettobetrag": amount(source, "Amount"),
        "lieferdatum": text(source, "CloseDate"),
    })
}

/// ERP order status -> CRM opportunity stage. Unknown statuses fall back to
/// the initial stage rather than failing the sync.
#[must_use]
pub fn stage_for_status(status: &str) -> &'static str {
    match status {
        "OPEN" => "Prospecting",
        "CONFIRMED" => "Committed",
        "SHIPPED" => "Fulfillment",
        "INVOICED" => "Closed Won",
        "CANCELLED" => "Closed Lost",
        _ => "Prospecting",
    }
}

/// CRM opportunity stage -> ERP order status. Inverse of [`stage_for_status`]
/// with the same fallback policy.
#[must_use]
pub fn status_for_stage(stage: &str) -> &'static str {
    match stage {
        "Prospecting" => "OPEN",
        "Committed" => "CONFIRMED",
        "Fulfillment" => "SHIPPED",
        "Closed Won" => "INVOICED",
        "Closed Lost" => "CANCELLED",
        _ => "OPEN",
    }
}

fn text(source: &Value, name: &str) -> Value {
    match source.get(name) {
        Some(value) if !value.is_null() => value.clone(),
        _ => Value::String(String::new()),
    }
}

fn flag(source: &Value, name: &str) -> Value {
    Value::Bool(source.get(name).and_then(Value::as_bool).unwrap_or(true))
}

fn amount(source: &Value, name: &str) -> Value {
    match source.get(name) {
        Some(value) if value.is_number() => value.clone(),
        _ => json!(0),
    }
}

fn field(source: &Value, name: &str) -> Value {
    source.get(name).cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_customer_gets_documented_defaults() {
        let account = customer_to_account(&json!({"name": "Acme", "kundennummer": "10001"}));

        assert_eq!(
            account,
            json!({
                "Id": null,
                "Name": "Acme",
                "ERP_ID__c": "10001",
                "AccountNumber": "",
                "Email__c": "",
                "Phone": "",
                "BillingStreet": "",
                "BillingPostalCode": "",
                "BillingCity": "",
                "Active__c": true,
            })
        );
    }

    #[test]
    fn full_customer_round_trips_identifiers() {
        let customer = json!({
            "name": "Acme GmbH",
            "kundennummer": "10001",
            "kontonummer": "4711",
            "email": "office@acme.test",
            "telefon": "+49 40 123456",
            "strasse": "Hafenstr. 1",
            "plz": "20457",
            "ort": "Hamburg",
            "aktiv": false,
            "crmId": "001ABC",
        });

        let round_tripped = account_to_customer(&customer_to_account(&customer));
        assert_eq!(round_tripped, customer);
    }

    #[test]
    fn order_round_trips_through_stage_table() {
        let order = json!({
            "auftragsnummer": "A-2001",
            "kundennummer": "10001",
            "betreff": "Q3 restock",
            "status": "SHIPPED",
            "nettobetrag": 1299.50,
            "lieferdatum": "2026-09-15",
            "crmId": "006XYZ",
        });

        let round_tripped = opportunity_to_order(&order_to_opportunity(&order));
        assert_eq!(round_tripped, order);
    }

    #[test]
    fn unknown_status_falls_back_to_initial_stage() {
        assert_eq!(stage_for_status("BACKORDERED"), "Prospecting");
        assert_eq!(stage_for_status(""), "Prospecting");
        assert_eq!(status_for_stage("Qualification"), "OPEN");
    }

    #[test]
    fn engine_dispatches_by_entity_and_direction() {
        let engine = TransformationEngine::new();

        let account = engine
            .map("customer", SyncDirection::ErpToCrm, &json!({"name": "Acme"}))
            .unwrap();
        assert_eq!(account["Name"], "Acme");

        let order = engine
            .map("opportunity", SyncDirection::CrmToErp, &json!({"Name": "Deal"}))
            .unwrap();
        assert_eq!(order["betreff"], "Deal");
    }

    #[test]
    fn wrong_direction_is_a_validation_failure() {
        let engine = TransformationEngine::new();
        let err = engine
            .map("customer", SyncDirection::CrmToErp, &json!({}))
            .unwrap_err();
        assert!(matches!(err, SyncError::ValidationFailure(_)));
    }

    #[test]
    fn routing_resolves_counterpart_endpoints() {
        let engine = TransformationEngine::new();
        assert_eq!(engine.target_endpoint("customer", SyncDirection::ErpToCrm).unwrap(), "accounts");
        assert_eq!(engine.target_endpoint("account", SyncDirection::CrmToErp).unwrap(), "customers");
        assert_eq!(
            engine.target_endpoint("salesOrder", SyncDirection::ErpToCrm).unwrap(),
            "opportunities"
        );
        assert_eq!(
            engine.target_endpoint("opportunity", SyncDirection::CrmToErp).unwrap(),
            "salesOrders"
        );
        assert!(engine.target_endpoint("invoice", SyncDirection::ErpToCrm).is_err());
    }

    #[test]
    fn explicit_null_fields_become_defaults() {
        let account = customer_to_account(&json!({"name": null, "aktiv": null}));
        assert_eq!(account["Name"], "");
        assert_eq!(account["Active__c"], true);
    }
}
