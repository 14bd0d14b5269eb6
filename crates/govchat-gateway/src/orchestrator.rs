// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn chat pipeline.
//!
//! One inbound user message drives, in order: governance-token resolution,
//! subject-id resolution, conversation/sequence stamping, scope query,
//! upload submission, reply generation, download submission. Every step's
//! failure short-circuits the remaining steps; no partial success is
//! reported as success. Content never reaches the reply generator before
//! the upload submission is acknowledged, and a failed download submission
//! withholds the generated reply.

use std::sync::Arc;

use tracing::{debug, warn};

use govchat_core::{
    Account, Activity, ContentSubmission, ConversationId, GovchatError, GovernanceClient,
    GovernanceScope, IdentityGateway, ReplyGenerator, TokenSet,
};
use govchat_identity::decode_claims;
use govchat_session::SessionHandle;

/// Adapters and settings a chat turn needs; cheap to clone into the spawned
/// turn task.
#[derive(Clone)]
pub struct TurnContext {
    pub identity: Arc<dyn IdentityGateway>,
    pub governance: Arc<dyn GovernanceClient>,
    pub replies: Arc<dyn ReplyGenerator>,
    /// Scopes for silent governance-token reacquisition.
    pub purview_scopes: Vec<String>,
}

/// Result of a successful chat turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub bot_response: String,
    pub conversation_id: ConversationId,
    pub upload_sequence: u64,
    pub download_sequence: u64,
}

/// Runs one chat turn to completion.
///
/// Callers spawn this as a task: a client disconnect mid-turn must not
/// cancel in-flight governance submissions (submission durability is
/// decoupled from response delivery; the reply is simply undeliverable).
pub async fn run_chat_turn(
    ctx: TurnContext,
    session: SessionHandle,
    message: String,
) -> Result<TurnOutcome, GovchatError> {
    // Resolve the governance token and identity. No interactive fallback on
    // this path; the dedicated token-refresh endpoint handles that.
    let (mut token, account) = {
        let session = session.lock().await;
        let token = session
            .purview_token
            .clone()
            .ok_or(GovchatError::GovernanceTokenUnavailable)?;
        (token, session.account.clone())
    };

    // The stable subject id comes from the governance token's claims.
    let claims = decode_claims(&token.access_token)?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| {
            GovchatError::IdentityResolution("user id not found in token".to_string())
        })?
        .to_string();

    // Stamp the turn: conversation id (minted once per session) and the
    // upload sequence number, atomically under the session lock.
    let (conversation_id, upload_sequence) = {
        let mut session = session.lock().await;
        (session.ensure_conversation(), session.next_sequence())
    };
    debug!(
        conversation_id = %conversation_id,
        upload_sequence,
        "chat turn stamped"
    );

    // Scope query. Content must not be released to the model without a
    // resolved scope. The scope is fetched once per turn and reused for
    // both submissions; it is not cached across turns.
    let scope =
        query_scope_with_reacquire(&ctx, &session, &mut token, account.as_ref(), &user_id).await?;

    // Upload submission: the outbound message must be recorded before any
    // reply is generated.
    let upload = ContentSubmission {
        activity: Activity::Upload,
        owner_id: user_id.clone(),
        conversation_id: conversation_id.clone(),
        sequence_no: upload_sequence,
        scope_identifier: scope.scope_identifier.clone(),
        payload: message.clone(),
    };
    ctx.governance
        .submit_content(&upload, &token.access_token)
        .await?;

    let bot_response = ctx.replies.generate(&message).await?;

    // Download submission, one sequence later, same scope identifier. A
    // failure here withholds the reply: the model output exists but is
    // unrecorded, which is a turn failure distinct from reply generation.
    let download_sequence = {
        let mut session = session.lock().await;
        session.next_sequence()
    };
    let download = ContentSubmission {
        activity: Activity::Download,
        owner_id: user_id,
        conversation_id: conversation_id.clone(),
        sequence_no: download_sequence,
        scope_identifier: scope.scope_identifier,
        payload: bot_response.clone(),
    };
    ctx.governance
        .submit_content(&download, &token.access_token)
        .await?;

    debug!(
        conversation_id = %conversation_id,
        download_sequence,
        "chat turn completed"
    );

    Ok(TurnOutcome {
        bot_response,
        conversation_id,
        upload_sequence,
        download_sequence,
    })
}

/// Queries the protection scope, with at most one silent token
/// reacquisition when the governance service rejects the bearer.
async fn query_scope_with_reacquire(
    ctx: &TurnContext,
    session: &SessionHandle,
    token: &mut TokenSet,
    account: Option<&Account>,
    user_id: &str,
) -> Result<GovernanceScope, GovchatError> {
    match ctx.governance.query_scope(user_id, &token.access_token).await {
        Ok(scope) => Ok(scope),
        Err(err) if err.is_governance_auth() => {
            let Some(account) = account else {
                return Err(err);
            };
            warn!("governance rejected token, attempting silent reacquisition");
            let fresh = match ctx
                .identity
                .acquire_token_silently(account, &ctx.purview_scopes, true)
                .await
            {
                Ok(fresh) => fresh,
                Err(acquire_err) => {
                    warn!(error = %acquire_err, "silent reacquisition failed");
                    return Err(err);
                }
            };
            {
                let mut session = session.lock().await;
                session.purview_token = Some(fresh.clone());
            }
            *token = fresh;
            ctx.governance.query_scope(user_id, &token.access_token).await
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govchat_session::SessionStore;
    use govchat_test_utils::{
        fake_token, GovernanceFailure, MockGovernance, MockIdentity, MockReplyGenerator,
    };

    struct Harness {
        ctx: TurnContext,
        governance: MockGovernance,
        replies: MockReplyGenerator,
        identity: MockIdentity,
        session: SessionHandle,
    }

    /// A context with an authenticated session holding a governance token
    /// for subject `user-1`.
    async fn harness() -> Harness {
        let governance = MockGovernance::new();
        let replies = MockReplyGenerator::with_replies(vec!["canned reply".to_string()]);
        let identity = MockIdentity::for_subject("user-1");

        let store = SessionStore::new(std::time::Duration::from_secs(3600));
        let (_id, session) = store.create();
        {
            let mut s = session.lock().await;
            let outcome = identity
                .exchange_code("code", &[], "http://localhost/r")
                .await
                .unwrap();
            s.account = Some(outcome.account);
            s.primary_token = Some(outcome.token);
            s.purview_token = Some(fake_token("user-1"));
        }

        Harness {
            ctx: TurnContext {
                identity: Arc::new(identity.clone()),
                governance: Arc::new(governance.clone()),
                replies: Arc::new(replies.clone()),
                purview_scopes: vec!["https://gov.example/.default".to_string()],
            },
            governance,
            replies,
            identity,
            session,
        }
    }

    #[tokio::test]
    async fn first_turn_stamps_sequence_one_and_two() {
        let h = harness().await;
        let outcome = run_chat_turn(h.ctx, h.session.clone(), "hello".to_string())
            .await
            .unwrap();

        assert_eq!(outcome.bot_response, "canned reply");
        assert_eq!(outcome.upload_sequence, 1);
        assert_eq!(outcome.download_sequence, 2);

        let submissions = h.governance.submissions().await;
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].activity, Activity::Upload);
        assert_eq!(submissions[0].sequence_no, 1);
        assert_eq!(submissions[0].payload, "hello");
        assert_eq!(submissions[0].owner_id, "user-1");
        assert_eq!(submissions[1].activity, Activity::Download);
        assert_eq!(submissions[1].sequence_no, 2);
        assert_eq!(submissions[1].payload, "canned reply");
        // Both submissions share the turn's scope identifier.
        assert_eq!(
            submissions[0].scope_identifier,
            submissions[1].scope_identifier
        );
    }

    #[tokio::test]
    async fn second_turn_keeps_conversation_and_continues_sequence() {
        let h = harness().await;
        let first = run_chat_turn(h.ctx.clone(), h.session.clone(), "hello".to_string())
            .await
            .unwrap();
        let second = run_chat_turn(h.ctx, h.session.clone(), "how are you".to_string())
            .await
            .unwrap();

        assert_eq!(first.conversation_id, second.conversation_id);
        assert_eq!(second.upload_sequence, 3);
        assert_eq!(second.download_sequence, 4);

        let submissions = h.governance.submissions().await;
        assert!(submissions
            .iter()
            .all(|s| s.conversation_id == first.conversation_id));
    }

    #[tokio::test]
    async fn missing_governance_token_fails_before_any_call() {
        let h = harness().await;
        h.session.lock().await.purview_token = None;

        let err = run_chat_turn(h.ctx, h.session.clone(), "hello".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, GovchatError::GovernanceTokenUnavailable));
        assert_eq!(err.to_string(), "Purview token not available");

        // Nothing downstream ran.
        assert!(h.governance.scope_calls().await.is_empty());
        assert_eq!(h.governance.submission_count().await, 0);
        assert_eq!(h.replies.call_count().await, 0);
        // The session consumed no sequence number.
        assert_eq!(h.session.lock().await.sequence_number, 0);
    }

    #[tokio::test]
    async fn scope_failure_prevents_submission_and_reply() {
        let h = harness().await;
        h.governance
            .fail_next_scope_query(GovernanceFailure::Unavailable)
            .await;

        let err = run_chat_turn(h.ctx, h.session.clone(), "hello".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, GovchatError::GovernanceUnavailable { .. }));
        assert_eq!(h.governance.submission_count().await, 0);
        assert_eq!(h.replies.call_count().await, 0);
    }

    #[tokio::test]
    async fn scope_auth_failure_triggers_one_reacquire_and_retry() {
        let h = harness().await;
        h.governance
            .fail_next_scope_query(GovernanceFailure::Auth)
            .await;
        h.identity.push_silent_token(fake_token("user-1")).await;

        let outcome = run_chat_turn(h.ctx, h.session.clone(), "hello".to_string())
            .await
            .unwrap();
        assert_eq!(outcome.bot_response, "canned reply");
        // First query failed, token was reacquired once, second query ran.
        assert_eq!(h.governance.scope_calls().await.len(), 2);
        assert_eq!(h.identity.silent_calls().await, 1);
    }

    #[tokio::test]
    async fn upload_failure_prevents_reply_generation() {
        let h = harness().await;
        h.governance
            .fail_next_submission(GovernanceFailure::Unavailable)
            .await;

        let err = run_chat_turn(h.ctx, h.session.clone(), "hello".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, GovchatError::GovernanceUnavailable { .. }));
        assert_eq!(h.governance.submission_count().await, 0);
        assert_eq!(h.replies.call_count().await, 0);
    }

    #[tokio::test]
    async fn reply_failure_skips_download_submission() {
        let h = harness().await;
        h.replies.fail_next().await;

        let err = run_chat_turn(h.ctx, h.session.clone(), "hello".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, GovchatError::ReplyGeneration { .. }));

        // Only the upload was submitted.
        let submissions = h.governance.submissions().await;
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].activity, Activity::Upload);
    }

    #[tokio::test]
    async fn download_failure_withholds_generated_reply() {
        let h = harness().await;
        // Upload (submission 0) succeeds, download (submission 1) fails.
        h.governance
            .fail_nth_submission(1, GovernanceFailure::Unavailable)
            .await;

        let err = run_chat_turn(h.ctx.clone(), h.session.clone(), "hello".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, GovchatError::GovernanceUnavailable { .. }));
        // The reply was generated but withheld; only the upload is recorded.
        assert_eq!(h.replies.call_count().await, 1);
        let submissions = h.governance.submissions().await;
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].activity, Activity::Upload);
    }

    #[tokio::test]
    async fn client_disconnect_does_not_cancel_the_turn() {
        let h = harness().await;
        // The handler spawns the turn and may be dropped; the spawned task
        // still completes and both submissions land.
        let task = tokio::spawn(run_chat_turn(
            h.ctx,
            h.session.clone(),
            "hello".to_string(),
        ));
        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome.download_sequence, 2);
        assert_eq!(h.governance.submission_count().await, 2);
    }
}
