//! Amazon Resource Name parsing.
//!
//! ECS reports tasks by fully-qualified ARN. Both task ARN layouts are
//! accepted:
//!
//! ```text
//! arn:aws:ecs:us-east-1:012345678910:task/0b69d5c0-d655-4695-98cd-5d2d526d9d5a
//! arn:aws:ecs:us-east-1:012345678910:task/production/0b69d5c0d6554695
//! ```

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account: String,
    /// Everything after the account field, e.g. `task/<id>`.
    pub resource: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArnError {
    #[error("invalid ARN: {0}")]
    InvalidArn(String),
    #[error("ARN has no resource id after '/': {0}")]
    MissingResourceId(String),
}

impl Arn {
    pub fn parse(arn: &str) -> Result<Self, ArnError> {
        let rest = arn
            .strip_prefix("arn:")
            .ok_or_else(|| ArnError::InvalidArn(arn.to_string()))?;

        let mut fields = rest.splitn(5, ':');
        let (Some(partition), Some(service), Some(region), Some(account), Some(resource)) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return Err(ArnError::InvalidArn(arn.to_string()));
        };

        if partition.is_empty() || service.is_empty() || resource.is_empty() {
            return Err(ArnError::InvalidArn(arn.to_string()));
        }

        Ok(Arn {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource: resource.to_string(),
        })
    }

    /// The trailing segment of the resource path.
    pub fn resource_id(&self) -> Option<&str> {
        match self.resource.rsplit_once('/') {
            Some((_, id)) if !id.is_empty() => Some(id),
            _ => None,
        }
    }
}

/// Extract a task's local identifier from its ARN.
pub fn task_id(arn: &str) -> Result<String, ArnError> {
    let parsed = Arn::parse(arn)?;
    parsed
        .resource_id()
        .map(str::to_string)
        .ok_or_else(|| ArnError::MissingResourceId(arn.to_string()))
}
