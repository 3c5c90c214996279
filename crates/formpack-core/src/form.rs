//! Form and network configuration models.
//!
//! These mirror the JSON documents the form designer saves: a [`FormConfig`]
//! describing one contract function's input form, and a [`NetworkConfig`]
//! describing the chain the form targets.

use serde::{Deserialize, Serialize};

/// Wallet UI kit selection saved with a form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UiKitConfig {
    /// Kit identifier (e.g. `"rainbowkit"`), or `"custom"` / `"none"`.
    pub kit_name: String,
    /// Kit-specific configuration, carried verbatim into generated configs.
    #[serde(default)]
    pub kit_config: serde_json::Value,
}

/// A single field descriptor.
///
/// Array fields carry an element descriptor; object fields (and array
/// elements that are objects) carry component descriptors. Both nest
/// arbitrarily deep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Form state key.
    pub name: String,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Field type id (`"text"`, `"date"`, `"array"`, `"object"`, ...).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Element descriptor for array fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_field_config: Option<Box<FieldConfig>>,
    /// Component descriptors for object fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<FieldConfig>,
}

impl FieldConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            field_type: field_type.into(),
            element_field_config: None,
            components: Vec::new(),
        }
    }

    /// Set the array element descriptor.
    #[must_use]
    pub fn with_element(mut self, element: FieldConfig) -> Self {
        self.element_field_config = Some(Box::new(element));
        self
    }

    /// Set the object component descriptors.
    #[must_use]
    pub fn with_components(mut self, components: Vec<FieldConfig>) -> Self {
        self.components = components;
        self
    }
}

/// A finished form configuration as saved by the designer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    /// Contract function this form invokes.
    pub function_id: String,
    /// Address of the target contract.
    pub contract_address: String,
    /// Ordered top-level field descriptors.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    /// Chosen wallet UI kit, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_kit: Option<UiKitConfig>,
}

impl FormConfig {
    /// Distinct field type ids used anywhere in the form, in first-seen order.
    ///
    /// Recurses through array element descriptors and object components, so a
    /// date picker nested three levels deep still pulls in the date-field
    /// dependencies.
    #[must_use]
    pub fn distinct_field_types(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for field in &self.fields {
            collect_field_types(field, &mut seen);
        }
        seen
    }
}

fn collect_field_types(field: &FieldConfig, seen: &mut Vec<String>) {
    if !seen.iter().any(|t| t == &field.field_type) {
        seen.push(field.field_type.clone());
    }
    if let Some(element) = &field.element_field_config {
        collect_field_types(element, seen);
    }
    for component in &field.components {
        collect_field_types(component, seen);
    }
}

/// Target network description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Network id (e.g. `"ethereum-mainnet"`).
    pub id: String,
    /// Display label; falls back to the id when empty.
    #[serde(default)]
    pub label: String,
    /// Ecosystem id (e.g. `"evm"`).
    pub ecosystem: String,
    /// Block explorer service identifier (e.g. `"etherscan"`), when the
    /// network declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_service: Option<String>,
    /// Default public RPC endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

impl NetworkConfig {
    /// Display label, never empty.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_fields(fields: Vec<FieldConfig>) -> FormConfig {
        FormConfig {
            function_id: "transferFrom".to_string(),
            contract_address: "0x1234".to_string(),
            fields,
            ui_kit: None,
        }
    }

    #[test]
    fn test_distinct_field_types_dedupes_in_order() {
        let form = form_with_fields(vec![
            FieldConfig::new("to", "address"),
            FieldConfig::new("amount", "number"),
            FieldConfig::new("from", "address"),
        ]);

        assert_eq!(form.distinct_field_types(), vec!["address", "number"]);
    }

    #[test]
    fn test_distinct_field_types_recurses_array_elements() {
        let form = form_with_fields(vec![FieldConfig::new("deadlines", "array")
            .with_element(FieldConfig::new("deadline", "date"))]);

        assert_eq!(form.distinct_field_types(), vec!["array", "date"]);
    }

    #[test]
    fn test_distinct_field_types_recurses_nested_components() {
        let inner = FieldConfig::new("when", "date");
        let element = FieldConfig::new("entry", "object").with_components(vec![inner]);
        let form = form_with_fields(vec![
            FieldConfig::new("schedule", "array").with_element(element)
        ]);

        assert_eq!(form.distinct_field_types(), vec!["array", "object", "date"]);
    }

    #[test]
    fn test_form_config_parses_designer_json() {
        let json = r#"{
            "functionId": "mint",
            "contractAddress": "0xabc",
            "fields": [
                {"name": "recipient", "type": "address", "label": "Recipient"},
                {"name": "ids", "type": "array", "elementFieldConfig": {"name": "id", "type": "number"}}
            ],
            "uiKit": {"kitName": "rainbowkit", "kitConfig": {"theme": "dark"}}
        }"#;

        let form: FormConfig = serde_json::from_str(json).unwrap();
        assert_eq!(form.function_id, "mint");
        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.distinct_field_types(), vec!["address", "array", "number"]);
        assert_eq!(form.ui_kit.unwrap().kit_name, "rainbowkit");
    }

    #[test]
    fn test_network_display_label_falls_back_to_id() {
        let network: NetworkConfig = serde_json::from_str(
            r#"{"id": "ethereum-mainnet", "ecosystem": "evm"}"#,
        )
        .unwrap();
        assert_eq!(network.display_label(), "ethereum-mainnet");
        assert!(network.explorer_service.is_none());
    }
}
