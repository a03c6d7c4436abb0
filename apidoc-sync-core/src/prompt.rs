/// Stands in for the current docs on the first run.
pub const NO_CURRENT_DOCS: &str = "There is no current openapi docs";

/// Build the model prompt from the current documentation and the serialized codebase.
pub fn build_prompt(current_docs: &str, codebase_json: &str) -> String {
    format!(
        "I want to create docs based on this codebase.\n\
         I want to create openapi docs. I need Json format for openapi docs, json.\n\
         return json in ```json``` format.\n\
         There is current openapi docs:\n\
         {current_docs}\n\
         \n\
         Codebase: {codebase_json}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_both_sections() {
        let prompt = build_prompt(NO_CURRENT_DOCS, r#"[{"path":"/a.ts","content":"x"}]"#);
        assert!(prompt.contains("There is current openapi docs:\nThere is no current openapi docs"));
        assert!(prompt.ends_with(r#"Codebase: [{"path":"/a.ts","content":"x"}]"#));
        assert!(prompt.contains("```json```"));
    }
}
