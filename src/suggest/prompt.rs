use crate::error::FormError;
use crate::page::page_model::FieldDescriptor;

const INSTRUCTIONS: &str = r#"You are an AI assistant specialized in filling out web forms.
I will provide you with a list of form fields, including their 'identifier', 'id', 'name', 'kind', 'type', 'label', 'placeholder', 'tagName', 'currentValue', 'required' status, 'minLength', 'maxLength', 'pattern', and 'options' (for select/radio).
Your task is to generate appropriate values for each field based on its context, constraints, and the user's requirements.

Respond ONLY with a JSON object where keys are the 'identifier' of each field and values are the suggested fill values as strings.
If you cannot determine a value for a field, omit it from the JSON.

For 'select' fields, provide a value that exactly matches one of its 'options.value' or 'options.text'. Prioritize 'options.value'.
For 'radio' fields, provide the 'value' of the option that should be selected.
For 'checkbox' fields, provide 'true' or 'false'.
For 'number' fields, provide a numeric value.
For 'date', 'email', 'url', 'tel' fields, provide values in the correct format (dates as YYYY-MM-DD).
Respect 'required', 'minLength', 'maxLength', and 'pattern' constraints where feasible.
If a field already has a 'currentValue', consider if it should be kept or overridden based on the requirements.
If a field is 'required', try your best to provide a value.

Example JSON response:
{
  "firstName": "John",
  "lastName": "Doe",
  "email": "john.doe@example.com",
  "age": "30",
  "country": "US",
  "subscribeNewsletter": "true"
}"#;

/// Build the single prompt sent to the model for one analysis.
pub fn build_prompt(fields: &[FieldDescriptor], requirements: &str) -> Result<String, FormError> {
    let fields_json =
        serde_json::to_string_pretty(fields).map_err(|e| FormError::JsonSerialize {
            context: "field list".into(),
            source: e,
        })?;

    Ok(format!(
        r#"{INSTRUCTIONS}

Here are the form fields to consider:
{fields_json}

Here are the user's requirements:
"{requirements}"

Please generate the JSON object:"#
    ))
}
