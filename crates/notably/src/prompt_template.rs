use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// Render an inline tera template against a serializable context.
///
/// The template name carries no `.html` suffix, so tera does not autoescape
/// the rendered values.
pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    tera.render("inline_template", &context)
}
