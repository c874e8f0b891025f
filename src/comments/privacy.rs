// Comment Privacy - access rules evaluated at execution time for every operation
// Rules are checked on each request, independent of what any UI chose to render

use async_trait::async_trait;

use crate::{
    comments::model::Comment,
    core::UserId,
    error::{AppError, AppResult},
};

/// Privacy rule context for access control decisions
#[derive(Debug, Clone)]
pub struct PrivacyContext<'a> {
    pub operation: PrivacyOperation,
    pub viewer: Option<UserId>,
    pub comment: &'a Comment,
}

/// Operations that can be controlled by privacy policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyOperation {
    View,
    Update,
    Delete,
}

/// Privacy rule result
#[derive(Debug, Clone, PartialEq)]
pub enum PrivacyResult {
    Allow,
    Deny,
    Skip, // Skip this rule, continue to next
}

/// Trait for implementing privacy rules
#[async_trait]
pub trait PrivacyRule: Send + Sync {
    async fn evaluate(&self, ctx: &PrivacyContext<'_>) -> AppResult<PrivacyResult>;

    /// Get rule name for debugging
    fn name(&self) -> &str;

    fn operations(&self) -> Vec<PrivacyOperation>;

    /// Get rule priority (higher = evaluated first)
    fn priority(&self) -> i32;
}

/// Ordered rule set; the first non-`Skip` answer wins, no answer means deny.
#[derive(Default)]
pub struct PrivacyPolicy {
    rules: Vec<Box<dyn PrivacyRule>>,
}

impl PrivacyPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_rule(&mut self, rule: Box<dyn PrivacyRule>) {
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    pub async fn evaluate(&self, ctx: &PrivacyContext<'_>) -> AppResult<PrivacyResult> {
        for rule in &self.rules {
            if !rule.operations().contains(&ctx.operation) {
                continue;
            }
            match rule.evaluate(ctx).await? {
                PrivacyResult::Skip => continue,
                decided => {
                    tracing::debug!(
                        "Rule '{}' decided {:?} for {:?} on comment {}",
                        rule.name(),
                        decided,
                        ctx.operation,
                        ctx.comment.id
                    );
                    return Ok(decided);
                }
            }
        }
        Ok(PrivacyResult::Deny)
    }

    /// Like `evaluate`, but a denial becomes `Forbidden`.
    pub async fn enforce(&self, ctx: &PrivacyContext<'_>) -> AppResult<()> {
        match self.evaluate(ctx).await? {
            PrivacyResult::Allow => Ok(()),
            _ => {
                tracing::warn!(
                    "Denied {:?} on comment {} for viewer {:?}",
                    ctx.operation,
                    ctx.comment.id,
                    ctx.viewer
                );
                Err(AppError::Forbidden(format!(
                    "Only the author may {} this comment",
                    match ctx.operation {
                        PrivacyOperation::View => "view",
                        PrivacyOperation::Update => "modify",
                        PrivacyOperation::Delete => "delete",
                    }
                )))
            }
        }
    }
}

/// Any viewer, anonymous included, may open a single comment by id.
pub struct OpenViewRule;

#[async_trait]
impl PrivacyRule for OpenViewRule {
    async fn evaluate(&self, _ctx: &PrivacyContext<'_>) -> AppResult<PrivacyResult> {
        Ok(PrivacyResult::Allow)
    }

    fn name(&self) -> &str {
        "open_view"
    }

    fn operations(&self) -> Vec<PrivacyOperation> {
        vec![PrivacyOperation::View]
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Only the author may change or delete a comment.
pub struct AuthorOnlyRule;

#[async_trait]
impl PrivacyRule for AuthorOnlyRule {
    async fn evaluate(&self, ctx: &PrivacyContext<'_>) -> AppResult<PrivacyResult> {
        if ctx.comment.is_authored_by(ctx.viewer) {
            Ok(PrivacyResult::Allow)
        } else {
            Ok(PrivacyResult::Deny)
        }
    }

    fn name(&self) -> &str {
        "author_only"
    }

    fn operations(&self) -> Vec<PrivacyOperation> {
        vec![PrivacyOperation::Update, PrivacyOperation::Delete]
    }

    fn priority(&self) -> i32 {
        200
    }
}

pub fn create_default_comment_policy() -> PrivacyPolicy {
    let mut policy = PrivacyPolicy::new();
    policy.register_rule(Box::new(AuthorOnlyRule));
    policy.register_rule(Box::new(OpenViewRule));
    policy
}
