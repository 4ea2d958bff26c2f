//! File skeletons rendered into the new layout.

use crate::error::{Error, Result};
use crate::utils::template::{self, TemplateVars};

pub const APPLICATION_STUB: &str = "application.stub";

const STUBS: &[(&str, &str)] = &[(APPLICATION_STUB, include_str!("../stubs/application.stub"))];

/// Variables available to every stub.
#[derive(Debug, Clone)]
pub struct StubContext {
    /// Application directory relative to the project root, e.g. `src/App`.
    pub app_path: String,
}

/// Produces the content of a named stub.
pub trait StubRenderer {
    fn render(&self, name: &str, context: &StubContext) -> Result<String>;
}

/// Stubs compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedStubs;

impl StubRenderer for EmbeddedStubs {
    fn render(&self, name: &str, context: &StubContext) -> Result<String> {
        let (_, raw) = STUBS
            .iter()
            .find(|(stub, _)| *stub == name)
            .ok_or_else(|| Error::stub_not_found(name))?;

        Ok(template::render(
            raw,
            &[(TemplateVars::APP_PATH, context.app_path.as_str())],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_stub_renders_app_path() {
        let context = StubContext {
            app_path: "src/App".to_string(),
        };
        let out = EmbeddedStubs.render(APPLICATION_STUB, &context).unwrap();

        assert!(out.starts_with("<?php"));
        assert!(out.contains("namespace App;"));
        assert!(out.contains("class Application extends \\Illuminate\\Foundation\\Application"));
        assert!(out.contains("'src/App'"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn unknown_stub_fails() {
        let context = StubContext {
            app_path: "src/App".to_string(),
        };
        let err = EmbeddedStubs.render("model.stub", &context).unwrap_err();
        assert_eq!(err.code.as_str(), "stub.not_found");
    }
}
