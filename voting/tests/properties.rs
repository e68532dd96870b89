//! Property tests for the vote action: whatever the backend does, the state
//! left on screen and the ledger flag stay consistent.

use civic_client::{ClientError, VoteReply};
use civic_nullables::{NullLedger, NullSession, NullVoteEndpoint};
use civic_types::{PostId, VoteState};
use civic_voting::{VoteError, VoteOutcome, VoteReconciler};
use proptest::prelude::*;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(f)
}

fn reconciler_for(
    reply: Result<VoteReply, ClientError>,
    voted: bool,
    post: &PostId,
) -> VoteReconciler<NullVoteEndpoint, NullLedger, NullSession> {
    let ledger = if voted {
        NullLedger::with_voted([post.clone()])
    } else {
        NullLedger::new()
    };
    VoteReconciler::new(
        NullVoteEndpoint::with_replies([reply]),
        ledger,
        NullSession::signed_in("token"),
    )
}

fn vote_once(
    reply: Result<VoteReply, ClientError>,
    current: VoteState,
) -> (VoteOutcome, Option<bool>) {
    let post = PostId::from("7");
    let r = reconciler_for(reply, current.user_voted, &post);
    let outcome = block_on(r.vote(&post, current, |_| {}));
    let entry = r.ledger().entry(&post);
    (outcome, entry)
}

fn any_state() -> impl Strategy<Value = VoteState> {
    (0u32..100_000, any::<bool>()).prop_map(|(votes, user_voted)| VoteState::new(votes, user_voted))
}

fn any_failure() -> impl Strategy<Value = Result<VoteReply, ClientError>> {
    prop_oneof![
        Just(Err(ClientError::Unauthorized)),
        Just(Err(ClientError::Forbidden("csrf".into()))),
        (500u16..600).prop_map(|status| Err(ClientError::Http {
            status,
            body: "oops".into()
        })),
        Just(Err(ClientError::Request("timed out".into()))),
        Just(Err(ClientError::Decode("not json".into()))),
        proptest::option::of("[a-z ]{1,20}").prop_map(|e| Ok(VoteReply::rejected(e))),
    ]
}

proptest! {
    #[test]
    fn accepted_without_counts_keeps_optimistic_state(current in any_state()) {
        let (outcome, entry) = vote_once(Ok(VoteReply::accepted()), current);
        prop_assert!(outcome.is_success());
        prop_assert_eq!(outcome.state, current.toggled());
        prop_assert_eq!(entry.unwrap_or(false), outcome.state.user_voted);
    }

    #[test]
    fn server_state_always_wins(current in any_state(), server in any_state()) {
        let (outcome, entry) = vote_once(Ok(VoteReply::authoritative(server)), current);
        prop_assert_eq!(outcome.state, server);
        prop_assert_eq!(entry.unwrap_or(false), server.user_voted);
    }

    #[test]
    fn any_failure_restores_previous_state(current in any_state(), reply in any_failure()) {
        let (outcome, entry) = vote_once(reply, current);
        prop_assert!(!outcome.is_success());
        prop_assert_eq!(outcome.state, current);
        prop_assert_eq!(entry.unwrap_or(false), current.user_voted);
    }

    #[test]
    fn up_then_down_returns_to_start(votes in 0u32..100_000) {
        let post = PostId::from("3");
        let r = VoteReconciler::new(
            NullVoteEndpoint::new(),
            NullLedger::new(),
            NullSession::signed_in("token"),
        );
        let start = VoteState::new(votes, false);
        let up = block_on(r.vote(&post, start, |_| {}));
        let down = block_on(r.vote(&post, up.state, |_| {}));
        prop_assert_eq!(down.state, start);
        prop_assert_eq!(r.ledger().entry(&post), None);
    }
}

#[test]
fn authoritative_reply_scenario() {
    let (outcome, entry) = vote_once(
        Ok(VoteReply::authoritative(VoteState::new(12, true))),
        VoteState::new(10, false),
    );
    assert_eq!(outcome.state, VoteState::new(12, true));
    assert!(outcome.reconciled);
    assert_eq!(entry, Some(true));
}

#[test]
fn network_error_scenario() {
    let (outcome, entry) = vote_once(
        Err(ClientError::Request("connection refused".into())),
        VoteState::new(5, true),
    );
    assert_eq!(outcome.state, VoteState::new(5, true));
    assert!(matches!(outcome.error, Some(VoteError::Transport(_))));
    assert_eq!(entry, Some(true));
}
