//! Instruction building for code generation.
//!
//! Two instruction variants: generate-new when the editor buffer is
//! empty, edit-existing (embedding the current source verbatim) when
//! it is not. Both demand code-only output and customizer parameter
//! declarations so the generated model is tunable without re-prompting.

const CUSTOMIZER_CONVENTION: &str = r#"Declare tunable parameters using the OpenSCAD customizer convention:
- Group related parameters under section comments: /* [Section Name] */
- Numeric parameters carry a range comment: width = 20; // [5:100]
- Enumerated parameters carry an option-set comment: style = "round"; // [round, square, hex]"#;

/// Instruction for generating a model from scratch.
pub fn new_model_instruction(prompt: &str) -> String {
    format!(
        r#"You are an expert OpenSCAD code generator. Your task is to generate highly realistic, detailed, and functional OpenSCAD code based on user requests.

CRITICAL RULES:
1. Generate ONLY valid OpenSCAD code - no explanations, no markdown, no comments outside the code
2. Make models as realistic and detailed as possible
3. Use proper dimensions and proportions
4. Include appropriate modules and functions for reusability
5. Use transformations (translate, rotate, scale) effectively
6. Add realistic details like rounded edges, proper curves, and fine features
7. Use variables for easy customization
8. Ensure the code is production-ready and will render without errors

{customizer}

User request: {prompt}

Generate the OpenSCAD code now:"#,
        customizer = CUSTOMIZER_CONVENTION,
    )
}

/// Instruction for editing an existing model; embeds the current
/// source verbatim.
pub fn edit_model_instruction(prompt: &str, current_source: &str) -> String {
    format!(
        r#"You are an expert OpenSCAD code generator. The user has an existing model and wants it modified.

CRITICAL RULES:
1. Output ONLY the complete, updated OpenSCAD code - no explanations, no markdown, no comments outside the code
2. Preserve the parts of the model the request does not touch
3. Keep existing module structure and variable names where possible
4. Ensure the code is production-ready and will render without errors

{customizer}

Current OpenSCAD code:
{current_source}

User request: {prompt}

Generate the complete updated OpenSCAD code now:"#,
        customizer = CUSTOMIZER_CONVENTION,
    )
}

/// Picks the instruction variant based on whether the editor buffer
/// holds any source.
pub fn build_instruction(prompt: &str, current_source: &str) -> String {
    if current_source.trim().is_empty() {
        new_model_instruction(prompt)
    } else {
        edit_model_instruction(prompt, current_source)
    }
}
