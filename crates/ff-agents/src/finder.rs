//! `UrlFinder`: the lookup facade.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use ff_core::Error;
use ff_search::{ProviderStatus, SearchBackend, SearchBackendFactory};

use crate::extract::extract_url;
use crate::fields::AuxiliaryFields;
use crate::prompt::build_prompt;
use crate::reasoner::Reasoner;
use crate::templates::{
    TemplateDescriptor, TemplateRegistry, DATA_AWARE_TEMPLATE_ID, DEFAULT_TEMPLATE_ID,
};

pub const FOUND_MESSAGE: &str = "Foundation URL found successfully";

/// Outcome of one lookup. `success` is true exactly when `url` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    pub foundation_name: String,
    pub url: Option<String>,
    pub success: bool,
    pub message: String,
    pub search_provider: String,
    pub prompt_variation: u32,
    pub foundation_data_used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationSummary {
    pub template_id: u32,
    pub template_description: &'static str,
    pub template_pinned: bool,
    pub search_provider: String,
    pub foundation_data_fields: Vec<&'static str>,
}

/// Finds the official website of a foundation.
///
/// `find` borrows immutably and never changes state; the `switch_*` and
/// `update_*` operations take `&mut self` and leave state untouched on error.
pub struct UrlFinder {
    reasoner: Arc<dyn Reasoner>,
    factory: SearchBackendFactory,
    backend: Arc<dyn SearchBackend>,
    template_id: u32,
    template_pinned: bool,
    fields: AuxiliaryFields,
}

impl UrlFinder {
    /// Create a finder using the factory's default backend.
    pub fn new(reasoner: Arc<dyn Reasoner>, factory: SearchBackendFactory) -> Result<Self, Error> {
        let backend = factory.create_default()?;
        Ok(Self::with_backend(reasoner, factory, backend))
    }

    pub fn with_backend(
        reasoner: Arc<dyn Reasoner>,
        factory: SearchBackendFactory,
        backend: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            reasoner,
            factory,
            backend,
            template_id: DEFAULT_TEMPLATE_ID,
            template_pinned: false,
            fields: AuxiliaryFields::default(),
        }
    }

    /// Look up one organization.
    ///
    /// Only caller errors are returned as `Err`. Reasoning failures and
    /// answers without a usable URL come back as unsuccessful results.
    pub async fn find(&self, organization: &str) -> Result<LookupResult, Error> {
        let template = TemplateRegistry::get(self.effective_template_id())?;
        let prompt = build_prompt(organization, template, &self.fields, self.backend.name())?;
        let organization = organization.trim();

        info!(
            organization = %organization,
            provider = self.backend.name(),
            template = template.id,
            fields = self.fields.len(),
            "Looking up foundation URL"
        );

        let outcome = match self
            .reasoner
            .run(&prompt, organization, Arc::clone(&self.backend))
            .await
        {
            Ok(raw) => extract_url(&raw),
            Err(e) => Err(e),
        };

        let (url, message) = match outcome {
            Ok(url) => {
                info!(organization = %organization, url = %url, "Foundation URL found");
                (Some(url), FOUND_MESSAGE.to_string())
            }
            Err(Error::NoAnswer(message)) => {
                info!(organization = %organization, reason = %message, "No foundation URL");
                (None, message)
            }
            Err(e) => {
                warn!(organization = %organization, error = %e, "Foundation lookup failed");
                (None, format!("Error while searching for foundation URL: {e}"))
            }
        };

        Ok(LookupResult {
            foundation_name: organization.to_string(),
            success: url.is_some(),
            url,
            message,
            search_provider: self.backend.name().to_string(),
            prompt_variation: template.id,
            foundation_data_used: !self.fields.is_empty(),
        })
    }

    /// Select a template and pin it, disabling the data-aware default.
    pub fn switch_template(&mut self, id: u32) -> Result<(), Error> {
        let template = TemplateRegistry::get(id)?;
        self.template_id = template.id;
        self.template_pinned = true;
        Ok(())
    }

    pub fn switch_provider(&mut self, name: &str) -> Result<(), Error> {
        let backend = self.factory.create(Some(name))?;
        info!(from = self.backend.name(), to = backend.name(), "Switching search provider");
        self.backend = backend;
        Ok(())
    }

    /// Replace the auxiliary fields wholesale.
    pub fn update_auxiliary_fields(&mut self, fields: AuxiliaryFields) {
        self.fields = fields;
    }

    pub fn describe_configuration(&self) -> ConfigurationSummary {
        let id = self.effective_template_id();
        let template_description = TemplateRegistry::get(id)
            .map(|t| t.description)
            .unwrap_or_default();

        ConfigurationSummary {
            template_id: id,
            template_description,
            template_pinned: self.template_pinned,
            search_provider: self.backend.name().to_string(),
            foundation_data_fields: self.fields.keys(),
        }
    }

    pub fn templates(&self) -> &'static [TemplateDescriptor] {
        TemplateRegistry::list()
    }

    pub fn provider_statuses(&self) -> Vec<ProviderStatus> {
        self.factory.statuses()
    }

    pub fn search_provider(&self) -> &str {
        self.backend.name()
    }

    pub fn auxiliary_fields(&self) -> &AuxiliaryFields {
        &self.fields
    }

    fn effective_template_id(&self) -> u32 {
        if !self.template_pinned && !self.fields.is_empty() {
            DATA_AWARE_TEMPLATE_ID
        } else {
            self.template_id
        }
    }
}
