//! Prompt assembly.

use ff_core::Error;

use crate::fields::AuxiliaryFields;
use crate::templates::TemplateDescriptor;

/// Render the foundation data block. An empty field set renders as empty text.
pub fn render_fields_block(fields: &AuxiliaryFields) -> String {
    if fields.is_empty() {
        return String::new();
    }

    let lines = fields
        .iter()
        .map(|(field, value)| format!("- {}: {}", field.label(), value))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\nAVAILABLE FOUNDATION DATA:\n{lines}\n\nUse this information to help validate and confirm the correct foundation website.\n"
    )
}

/// Fill a template for one organization.
pub fn build_prompt(
    organization: &str,
    template: &TemplateDescriptor,
    fields: &AuxiliaryFields,
    search_provider: &str,
) -> Result<String, Error> {
    let organization = organization.trim();
    if organization.is_empty() {
        return Err(Error::invalid_input("Foundation name cannot be empty"));
    }

    Ok(template
        .body
        .replace("{organization}", organization)
        .replace("{search_provider}", search_provider)
        .replace("{foundation_data}", &render_fields_block(fields)))
}
