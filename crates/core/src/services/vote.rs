//! Vote service.
//!
//! Votes toggle: casting the same direction twice removes the vote, casting
//! the opposite direction flips it. Reputation is reversed-then-reapplied on
//! a flip, and the point values come from configuration.

use devflow_common::{AppError, AppResult, IdGenerator, ReputationConfig};
use devflow_db::{
    entities::{
        reputation_change::Reason,
        vote::{self, Direction, TargetType},
    },
    repositories::{
        AnswerRepository, CastOutcome, LedgerEntry, QuestionRepository, VoteMutation, VotePlan,
        VoteRepository,
    },
};

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    question_repo: QuestionRepository,
    answer_repo: AnswerRepository,
    points: ReputationConfig,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        vote_repo: VoteRepository,
        question_repo: QuestionRepository,
        answer_repo: AnswerRepository,
        points: ReputationConfig,
    ) -> Self {
        Self {
            vote_repo,
            question_repo,
            answer_repo,
            points,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote on a question or answer.
    ///
    /// Returns the user's resulting vote state on the target (`None` when
    /// the cast toggled an existing vote off).
    pub async fn cast(
        &self,
        user_id: &str,
        target_type: TargetType,
        target_id: &str,
        direction: Direction,
    ) -> AppResult<Option<Direction>> {
        let author_id = match target_type {
            TargetType::Question => self.question_repo.get_by_id(target_id).await?.author_id,
            TargetType::Answer => self.answer_repo.get_by_id(target_id).await?.author_id,
        };

        if author_id == user_id {
            return Err(AppError::Forbidden(
                "Voting on your own post is not allowed".to_string(),
            ));
        }

        let existing = self
            .vote_repo
            .find_by_user_and_target(user_id, target_type, target_id)
            .await?;

        let (plan, final_state) = build_plan(
            &self.points,
            &self.id_gen,
            user_id,
            target_type,
            target_id,
            &author_id,
            existing.as_ref(),
            direction,
        );

        match self.vote_repo.apply(plan).await? {
            CastOutcome::Applied => Ok(final_state),
            // A concurrent identical submit won the race; report its state
            CastOutcome::AbsorbedDuplicate => Ok(Some(direction)),
        }
    }
}

/// Points and ledger reason for one vote on one target kind.
const fn vote_award(
    points: &ReputationConfig,
    target_type: TargetType,
    direction: Direction,
) -> (i32, Reason) {
    match (target_type, direction) {
        (TargetType::Question, Direction::Up) => (points.question_upvote, Reason::QuestionUpvoted),
        (TargetType::Question, Direction::Down) => {
            (points.question_downvote, Reason::QuestionDownvoted)
        }
        (TargetType::Answer, Direction::Up) => (points.answer_upvote, Reason::AnswerUpvoted),
        (TargetType::Answer, Direction::Down) => (points.answer_downvote, Reason::AnswerDownvoted),
    }
}

/// Counter deltas for adding (+1) or removing (-1) a vote in a direction.
const fn counter_delta(direction: Direction, sign: i32) -> (i32, i32) {
    match direction {
        Direction::Up => (sign, 0),
        Direction::Down => (0, sign),
    }
}

/// Decide what a cast does: insert, toggle off, or flip.
///
/// Pure; all point values come from `points`. Returns the plan and the
/// user's resulting vote state.
#[allow(clippy::too_many_arguments)]
fn build_plan(
    points: &ReputationConfig,
    id_gen: &IdGenerator,
    user_id: &str,
    target_type: TargetType,
    target_id: &str,
    author_id: &str,
    existing: Option<&vote::Model>,
    direction: Direction,
) -> (VotePlan, Option<Direction>) {
    let award = |amount: i32, reason: Reason| LedgerEntry {
        id: id_gen.generate(),
        user_id: author_id.to_string(),
        amount,
        reason,
        related_id: Some(target_id.to_string()),
    };

    let (mutation, (up, down), ledger, final_state) = match existing {
        None => {
            let (amount, reason) = vote_award(points, target_type, direction);
            (
                VoteMutation::Insert {
                    vote_id: id_gen.generate(),
                    direction,
                },
                counter_delta(direction, 1),
                vec![award(amount, reason)],
                Some(direction),
            )
        }
        Some(prior) if prior.direction == direction => {
            // Toggle off: reverse the counter and the earlier award
            let (amount, _) = vote_award(points, target_type, direction);
            (
                VoteMutation::Remove {
                    vote_id: prior.id.clone(),
                },
                counter_delta(direction, -1),
                vec![award(-amount, Reason::VoteWithdrawn)],
                None,
            )
        }
        Some(prior) => {
            // Flip: reverse the old award, then apply the new one
            let (old_amount, _) = vote_award(points, target_type, prior.direction);
            let (new_amount, new_reason) = vote_award(points, target_type, direction);
            let (old_up, old_down) = counter_delta(prior.direction, -1);
            let (new_up, new_down) = counter_delta(direction, 1);
            (
                VoteMutation::Flip {
                    vote_id: prior.id.clone(),
                    direction,
                },
                (old_up + new_up, old_down + new_down),
                vec![
                    award(-old_amount, Reason::VoteWithdrawn),
                    award(new_amount, new_reason),
                ],
                Some(direction),
            )
        }
    };

    let plan = VotePlan {
        user_id: user_id.to_string(),
        target_type,
        target_id: target_id.to_string(),
        mutation,
        upvote_delta: up,
        downvote_delta: down,
        ledger,
    };

    (plan, final_state)
}
