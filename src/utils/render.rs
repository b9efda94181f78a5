#![forbid(unsafe_code)]

use lazy_static::lazy_static;
use tera::{Context, Tera};

use crate::utils::errors::Errors;

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// The templates are compiled into the binary so rendering never depends on
// a template directory existing at runtime.
lazy_static! {
    static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        match tera.add_raw_templates(vec![
            ("index.html", include_str!("../../templates/index.html")),
            ("error.html", include_str!("../../templates/error.html")),
        ]) {
            Ok(_) => tera,
            Err(e) => {
                panic!("Template compilation error: {}", &e.to_string());
            }
        }
    };
}

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// render_page:
// ---------------------------------------------------------------------------
/** Render the named view with the caller's data bag. */
pub fn render_page(view: &str, context: &Context) -> Result<String, Errors> {
    TEMPLATES.render(view, context)
        .map_err(|e| Errors::InternalFault(format!("rendering view '{}': {}", view, e)))
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_renders_greeting_and_form() {
        let mut ctx = Context::new();
        ctx.insert("name", "ani");
        ctx.insert("count", "");
        ctx.insert("from", "");
        ctx.insert("to", "");
        ctx.insert("values", &Vec::<i32>::new());
        let html = render_page("index.html", &ctx).unwrap();
        assert!(html.contains("Hello, ani!"));
        assert!(html.contains("name=\"count\""));
        assert!(!html.contains("Your random ints"));
    }

    #[test]
    fn index_renders_values_when_present() {
        let mut ctx = Context::new();
        ctx.insert("name", "");
        ctx.insert("count", "3");
        ctx.insert("from", "1");
        ctx.insert("to", "9");
        ctx.insert("values", &vec![4, 2, 7]);
        let html = render_page("index.html", &ctx).unwrap();
        assert!(html.contains("Your random ints"));
        assert!(html.contains("4, 2, 7"));
    }

    #[test]
    fn error_page_shows_status_and_message() {
        let mut ctx = Context::new();
        ctx.insert("status", &404u16);
        ctx.insert("message", "No route matches '/nope'.");
        let html = render_page("error.html", &ctx).unwrap();
        assert!(html.contains("Error: 404"));
        assert!(html.contains("No route matches"));
    }

    #[test]
    fn unknown_view_is_internal_fault() {
        assert!(matches!(render_page("missing.html", &Context::new()),
                         Err(Errors::InternalFault(_))));
    }
}
