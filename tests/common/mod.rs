#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use form_autofill::error::FormError;
use form_autofill::page::document::HtmlPage;
use form_autofill::page::page_model::FieldDescriptor;
use form_autofill::suggest::backend::TextGeneration;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn page(name: &str) -> HtmlPage {
    HtmlPage::from_file(&fixture_path(name)).unwrap()
}

pub fn field<'a>(fields: &'a [FieldDescriptor], identifier: &str) -> &'a FieldDescriptor {
    fields
        .iter()
        .find(|f| f.identifier == identifier)
        .unwrap_or_else(|| panic!("no field '{}'", identifier))
}

/// Backend that answers with a canned reply and remembers every prompt.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub reply: String,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl TextGeneration for RecordingBackend {
    fn generate(&self, prompt: &str) -> Result<String, FormError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Backend whose every call fails like an unreachable endpoint.
pub struct FailingBackend;

impl TextGeneration for FailingBackend {
    fn generate(&self, _prompt: &str) -> Result<String, FormError> {
        Err(FormError::Transport("connection refused".into()))
    }
}
