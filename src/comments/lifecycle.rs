// CommentService - the create/view/toggle/edit/delete/list operations shared by every owner type

use std::sync::Arc;

use crate::{
    comments::{
        forms::{self, FormRequest},
        model::{self, Comment, ResolvedOwner},
        privacy::{create_default_comment_policy, PrivacyContext, PrivacyOperation, PrivacyPolicy},
        registry::CommentableRegistry,
        store::{CommentRepository, NewComment, SqliteCommentRepository},
        views::{CardView, CreateOutcome, FormView, InserterView, ListView},
    },
    core::CommentId,
    error::{AppError, AppResult},
    infrastructure::{Database, ViewerContext},
};

#[derive(Clone)]
pub struct CommentService {
    repository: Arc<dyn CommentRepository>,
    registry: Arc<CommentableRegistry>,
    db: Database,
    policy: Arc<PrivacyPolicy>,
}

impl CommentService {
    pub fn new(db: Database, registry: Arc<CommentableRegistry>) -> Self {
        Self {
            repository: Arc::new(SqliteCommentRepository::new(db.clone())),
            registry,
            db,
            policy: Arc::new(create_default_comment_policy()),
        }
    }

    pub fn repository(&self) -> &Arc<dyn CommentRepository> {
        &self.repository
    }

    async fn load(&self, id: CommentId) -> AppResult<Comment> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))
    }

    /// Login first, then existence, then authorship.
    async fn load_for_mutation(
        &self,
        vc: &ViewerContext,
        raw_id: &str,
        operation: PrivacyOperation,
    ) -> AppResult<Comment> {
        let principal = vc.require_principal()?;
        let comment = self.load(CommentId::parse(raw_id)?).await?;
        self.policy
            .enforce(&PrivacyContext {
                operation,
                viewer: Some(principal.id),
                comment: &comment,
            })
            .await?;
        Ok(comment)
    }

    /// GET renders an empty form; POST creates a comment on `owner` authored
    /// by the current principal, or echoes the form back with its errors.
    pub async fn create(
        &self,
        vc: &ViewerContext,
        owner: &ResolvedOwner,
        request: &FormRequest,
    ) -> AppResult<CreateOutcome> {
        let principal = vc.require_principal()?;

        if !request.is_submission() {
            return Ok(CreateOutcome::Form(FormView::empty(owner.submission_url.clone())));
        }

        let (form, result) = forms::bind(&request.body);
        let input = match result {
            Ok(input) => input,
            Err(errors) => {
                tracing::debug!(
                    "Rejected comment submission on {}: {:?}",
                    owner.submission_url,
                    errors
                );
                return Ok(CreateOutcome::Form(FormView::rejected(
                    &form,
                    owner.submission_url.clone(),
                    None,
                    errors,
                )));
            }
        };

        let comment = self
            .repository
            .insert(NewComment {
                content: input.content,
                is_public: input.is_public,
                author: principal.id,
                owner: owner.owner.clone(),
            })
            .await?;
        tracing::info!(
            "Comment {} created on {} by {}",
            comment.id,
            owner.submission_url,
            principal
        );

        Ok(CreateOutcome::Inserted(InserterView {
            inserted: CardView::new(comment, Some(principal.id)),
            form_url: owner.submission_url.clone(),
        }))
    }

    pub async fn view(&self, vc: &ViewerContext, raw_id: &str) -> AppResult<CardView> {
        let comment = self.load(CommentId::parse(raw_id)?).await?;
        self.policy
            .enforce(&PrivacyContext {
                operation: PrivacyOperation::View,
                viewer: vc.user_id(),
                comment: &comment,
            })
            .await?;
        Ok(CardView::new(comment, vc.user_id()))
    }

    pub async fn toggle_visibility(&self, vc: &ViewerContext, raw_id: &str) -> AppResult<CardView> {
        let comment = self.load_for_mutation(vc, raw_id, PrivacyOperation::Update).await?;
        let updated = self
            .repository
            .update_visibility(comment.id, !comment.is_public)
            .await?;

        let visibility = if updated.is_public { "public" } else { "private" };
        tracing::info!("Comment {} is now {}", updated.id, visibility);
        Ok(CardView::new(updated, vc.user_id()))
    }

    /// GET returns the card in edit mode; a valid POST saves and returns the
    /// plain card; an invalid POST returns the card with the rejected form.
    pub async fn edit(
        &self,
        vc: &ViewerContext,
        raw_id: &str,
        request: &FormRequest,
    ) -> AppResult<CardView> {
        let comment = self.load_for_mutation(vc, raw_id, PrivacyOperation::Update).await?;
        let viewer = vc.user_id();

        if !request.is_submission() {
            let form = FormView::prefilled(&comment);
            return Ok(CardView::new(comment, viewer).with_form(form));
        }

        let (form, result) = forms::bind(&request.body);
        match result {
            Ok(input) => {
                let updated = self
                    .repository
                    .update_content(comment.id, &input.content, input.is_public)
                    .await?;
                tracing::info!("Comment {} edited", updated.id);
                Ok(CardView::new(updated, viewer))
            }
            Err(errors) => {
                let form = FormView::rejected(
                    &form,
                    model::edit_url(comment.id),
                    Some(comment.absolute_url()),
                    errors,
                );
                Ok(CardView::new(comment, viewer).with_form(form))
            }
        }
    }

    pub async fn delete(&self, vc: &ViewerContext, raw_id: &str) -> AppResult<()> {
        let comment = self.load_for_mutation(vc, raw_id, PrivacyOperation::Delete).await?;
        if !self.repository.delete(comment.id).await? {
            return Err(AppError::NotFound(format!("Comment {} not found", comment.id)));
        }
        tracing::info!("Comment {} deleted", comment.id);
        Ok(())
    }

    /// Public comments on `owner` plus the viewer's own.
    pub async fn list(&self, owner: &ResolvedOwner, vc: &ViewerContext) -> AppResult<ListView> {
        let comments = self.repository.list_visible(&owner.owner, vc.user_id()).await?;
        Ok(ListView::new(owner, comments, vc.user_id()))
    }

    /// Resolve the live owner of a stored comment.
    pub async fn owner_of(&self, comment: &Comment) -> AppResult<ResolvedOwner> {
        comment.owner(&self.registry, &self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::capability::tests::Widget;
    use crate::comments::registry::CommentableRegistryBuilder;
    use crate::core::UserId;
    use crate::infrastructure::Principal;

    struct Fixture {
        service: CommentService,
        owner: ResolvedOwner,
    }

    async fn fixture() -> Fixture {
        let db = Database::new_in_memory().await.unwrap();
        let mut builder = CommentableRegistryBuilder::new();
        let widgets = builder.register::<Widget>().unwrap();
        let service = CommentService::new(db, Arc::new(builder.build()));
        Fixture {
            service,
            owner: widgets.bind(&Widget { id: 1 }),
        }
    }

    fn user(id: i64) -> ViewerContext {
        ViewerContext::authenticated(
            Principal { id: UserId(id), username: None },
            "req".into(),
            "/widget/add_comment/1".into(),
            "/accounts/login/".into(),
        )
    }

    fn anonymous(path: &str) -> ViewerContext {
        ViewerContext::anonymous("req".into(), path.into(), "/accounts/login/".into())
    }

    async fn create(fx: &Fixture, vc: &ViewerContext, body: &'static str) -> Comment {
        match fx.service.create(vc, &fx.owner, &FormRequest::post(body)).await.unwrap() {
            CreateOutcome::Inserted(view) => view.inserted.comment,
            CreateOutcome::Form(form) => panic!("unexpected form: {:?}", form.errors),
        }
    }

    #[tokio::test]
    async fn test_create_then_view_roundtrip() {
        let fx = fixture().await;
        let comment = create(&fx, &user(1), "content=Lorem+ipsum").await;

        let card = fx.service.view(&anonymous("/"), &comment.id.to_string()).await.unwrap();
        assert_eq!(card.comment.content, "Lorem ipsum");
        assert!(!card.comment.is_public);
        assert_eq!(card.comment.author, UserId(1));
        assert!(!card.is_author);
        assert_eq!(fx.service.owner_of(&card.comment).await.unwrap(), fx.owner);
    }

    #[tokio::test]
    async fn test_create_requires_login() {
        let fx = fixture().await;
        let result = fx
            .service
            .create(&anonymous("/widget/add_comment/1"), &fx.owner, &FormRequest::get())
            .await;
        match result {
            Err(AppError::AuthenticationRequired { location }) => {
                assert_eq!(location, "/accounts/login/?next=/widget/add_comment/1")
            }
            other => panic!("expected redirect, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_create_get_and_invalid_post_render_form() {
        let fx = fixture().await;
        match fx.service.create(&user(1), &fx.owner, &FormRequest::get()).await.unwrap() {
            CreateOutcome::Form(form) => {
                assert_eq!(form.submit_url, "/widget/add_comment/1");
                assert!(form.errors.is_empty());
                assert!(form.revert_url.is_none());
            }
            CreateOutcome::Inserted(_) => panic!("GET must not create"),
        }

        match fx
            .service
            .create(&user(1), &fx.owner, &FormRequest::post("is_public=on"))
            .await
            .unwrap()
        {
            CreateOutcome::Form(form) => {
                assert!(form.errors.contains_key("content"));
                assert!(form.is_public);
            }
            CreateOutcome::Inserted(_) => panic!("invalid POST must not create"),
        }
    }

    #[tokio::test]
    async fn test_mutations_restricted_to_author() {
        let fx = fixture().await;
        let comment = create(&fx, &user(1), "content=mine").await;
        let id = comment.id.to_string();

        assert!(matches!(
            fx.service.toggle_visibility(&user(2), &id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            fx.service.edit(&user(2), &id, &FormRequest::get()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(fx.service.delete(&user(2), &id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(
            fx.service.delete(&anonymous("/"), &id).await,
            Err(AppError::AuthenticationRequired { .. })
        ));

        let still_there = fx.service.view(&user(2), &id).await.unwrap();
        assert_eq!(still_there.comment.content, "mine");
    }

    #[tokio::test]
    async fn test_toggle_flips_visibility() {
        let fx = fixture().await;
        let comment = create(&fx, &user(1), "content=flip").await;
        let id = comment.id.to_string();

        assert!(fx.service.toggle_visibility(&user(1), &id).await.unwrap().comment.is_public);
        assert!(!fx.service.toggle_visibility(&user(1), &id).await.unwrap().comment.is_public);
    }

    #[tokio::test]
    async fn test_edit_flow() {
        let fx = fixture().await;
        let comment = create(&fx, &user(1), "content=draft").await;
        let id = comment.id.to_string();

        let card = fx.service.edit(&user(1), &id, &FormRequest::get()).await.unwrap();
        let form = card.form.unwrap();
        assert_eq!(form.content, "draft");
        assert_eq!(form.revert_url, Some(format!("/comments/view/{}", id)));

        let card = fx
            .service
            .edit(&user(1), &id, &FormRequest::post("title=Modified+valid+title"))
            .await
            .unwrap();
        assert!(card.form.unwrap().errors.contains_key("content"));
        assert_eq!(card.comment.content, "draft");

        let card = fx
            .service
            .edit(&user(1), &id, &FormRequest::post("content=final&is_public=on"))
            .await
            .unwrap();
        assert!(card.form.is_none());
        assert_eq!(card.comment.content, "final");
        assert!(card.comment.is_public);
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let fx = fixture().await;
        let comment = create(&fx, &user(1), "content=bye").await;
        let id = comment.id.to_string();

        fx.service.delete(&user(1), &id).await.unwrap();
        assert!(matches!(fx.service.view(&user(1), &id).await, Err(AppError::NotFound(_))));
        assert!(matches!(fx.service.delete(&user(1), &id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_union_of_public_and_own() {
        let fx = fixture().await;
        let private_one = create(&fx, &user(1), "content=private+one").await;
        let public_two = create(&fx, &user(2), "content=public+two&is_public=on").await;
        create(&fx, &user(2), "content=private+two").await;

        let anonymous_view = fx.service.list(&fx.owner, &anonymous("/")).await.unwrap();
        let ids: Vec<_> = anonymous_view.comments.iter().map(|c| c.comment.id).collect();
        assert_eq!(ids, vec![public_two.id]);
        assert_eq!(anonymous_view.submission_url, "/widget/add_comment/1");
        assert_eq!(anonymous_view.head.as_deref(), Some("Comments on widget"));

        let as_one = fx.service.list(&fx.owner, &user(1)).await.unwrap();
        let ids: Vec<_> = as_one.comments.iter().map(|c| c.comment.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&private_one.id));
        assert!(ids.contains(&public_two.id));
        assert!(as_one.comments.iter().find(|c| c.comment.id == private_one.id).unwrap().is_author);
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let fx = fixture().await;
        assert!(matches!(fx.service.view(&user(1), "123").await, Err(AppError::NotFound(_))));
        assert!(matches!(
            fx.service.toggle_visibility(&user(1), "nope").await,
            Err(AppError::NotFound(_))
        ));
    }
}
