//! Semantic overrides keyed by field and struct name.
//!
//! These rules carry platform knowledge that cannot be read off the type
//! shape. They match output names, so they run again after expansion.

use crate::ir::{FieldIR, Optionality, PlanHint};

/// Top-level resources whose `name` is their immutable identity.
const NAMED_RESOURCES: &[&str] = &["StoragePool", "Domain", "Network", "StorageVolume"];

/// Top-level resources whose `type` is immutable.
const TYPED_RESOURCES: &[&str] = &["StoragePool", "Domain", "Network"];

/// One override rule.
#[derive(Debug, Clone, Copy)]
pub struct OverrideRule {
    /// Output names the rule applies to.
    pub fields: &'static [&'static str],
    /// Owning structs the rule is limited to; empty means any struct.
    pub structs: &'static [&'static str],
    /// Optionality forced on matching fields.
    pub optionality: Optionality,
    /// Planning hint set on matching fields.
    pub plan_hint: Option<PlanHint>,
}

impl OverrideRule {
    /// Returns true if the rule applies to a field of the given struct.
    #[must_use]
    pub fn matches(&self, struct_name: &str, field: &FieldIR) -> bool {
        if !self.fields.contains(&field.output_name.as_str()) {
            return false;
        }
        if self.structs.is_empty() {
            return true;
        }
        self.structs.contains(&struct_name) && field.flattened_attribute().is_none()
    }

    fn apply(&self, field: &mut FieldIR) {
        field.optionality = self.optionality;
        if self.plan_hint.is_some() {
            field.plan_hint = self.plan_hint;
        }
    }
}

/// Rule table, applied in order.
pub const OVERRIDE_RULES: &[OverrideRule] = &[
    OverrideRule {
        fields: &["uuid", "id", "key"],
        structs: &[],
        optionality: Optionality::Computed,
        plan_hint: Some(PlanHint::KeepPriorState),
    },
    OverrideRule {
        fields: &["name"],
        structs: NAMED_RESOURCES,
        optionality: Optionality::Required,
        plan_hint: Some(PlanHint::RequiresReplace),
    },
    OverrideRule {
        fields: &["type"],
        structs: TYPED_RESOURCES,
        optionality: Optionality::Required,
        plan_hint: Some(PlanHint::RequiresReplace),
    },
    OverrideRule {
        fields: &["capacity"],
        structs: &["StoragePool"],
        optionality: Optionality::Computed,
        plan_hint: Some(PlanHint::KeepPriorState),
    },
    OverrideRule {
        fields: &["allocation", "available"],
        structs: &["StoragePool"],
        optionality: Optionality::Computed,
        plan_hint: None,
    },
    OverrideRule {
        fields: &["capacity", "allocation", "physical"],
        structs: &["StorageVolume"],
        optionality: Optionality::Computed,
        plan_hint: None,
    },
];

/// Applies the rule table to the fields of one struct.
pub fn apply_overrides(struct_name: &str, fields: &mut [FieldIR]) {
    for field in fields.iter_mut() {
        for rule in OVERRIDE_RULES {
            if rule.matches(struct_name, field) {
                rule.apply(field);
            }
        }
    }
}
