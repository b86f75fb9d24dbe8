//! Click tracking service

use std::sync::Arc;

use tracing::info;

use crate::errors::{BioLinksError, Result};
use crate::storage::{ClickEvent, ClickStore, LinkClickCount};

/// `link_click.link_name` 列的最大长度
pub const MAX_LINK_NAME_LEN: usize = 255;

/// 校验链接名：缺失或空串视为缺失，超长同样拒绝
pub fn validate_link_name(link_name: Option<&str>) -> Result<&str> {
    match link_name {
        None | Some("") => Err(BioLinksError::validation("Link name is required")),
        Some(name) if name.chars().count() > MAX_LINK_NAME_LEN => {
            Err(BioLinksError::validation(format!(
                "Link name must be at most {} characters",
                MAX_LINK_NAME_LEN
            )))
        }
        Some(name) => Ok(name),
    }
}

#[derive(Clone)]
pub struct ClickService {
    store: Arc<ClickStore>,
}

impl ClickService {
    pub fn new(store: Arc<ClickStore>) -> Self {
        Self { store }
    }

    /// 校验后写入一条点击；校验失败时不会触碰存储
    pub async fn track_click(&self, link_name: Option<&str>) -> Result<ClickEvent> {
        let name = validate_link_name(link_name)?;
        let event = self.store.record_click(name).await?;
        info!("Click tracked: {}", event.link_name);
        Ok(event)
    }

    pub async fn click_counts(&self) -> Result<Vec<LinkClickCount>> {
        self.store.click_counts().await
    }

    pub async fn total_clicks(&self) -> Result<u64> {
        self.store.count_clicks(None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_empty_names_are_rejected() {
        for input in [None, Some("")] {
            let err = validate_link_name(input).unwrap_err();
            assert!(matches!(err, BioLinksError::Validation(_)));
            assert_eq!(err.message(), "Link name is required");
        }
    }

    #[test]
    fn test_whitespace_name_is_accepted_verbatim() {
        assert_eq!(validate_link_name(Some("  ")).unwrap(), "  ");
        assert_eq!(validate_link_name(Some("GitHub")).unwrap(), "GitHub");
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_LINK_NAME_LEN);
        assert!(validate_link_name(Some(&at_limit)).is_ok());

        let over = "a".repeat(MAX_LINK_NAME_LEN + 1);
        assert!(matches!(
            validate_link_name(Some(&over)),
            Err(BioLinksError::Validation(_))
        ));
    }
}
