//! The round state machine
//!
//! [`RoundEngine`] is the sole owner of round state. It is synchronous and
//! performs no I/O of its own: questions come from a [`QuestionBank`], the
//! high score lives in a [`PersistentStore`], scores leave through a
//! [`ScoreSubmitter`], and anything that has to happen later is handed to a
//! [`Scheduler`] as an [`AlarmMessage`]. Everything the UI needs to know is
//! announced as a [`RoundEvent`] to the subscribed observers.
//!
//! A session runs `Idle → QuestionActive → Evaluating → Resolution` for
//! each question, and ends in `Finished` once the round length is reached.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    RoundEvent, SoundCue,
    bank::QuestionBank,
    config::GameConfig,
    constants,
    error::RoundError,
    observer::{ObserverId, Observers, RoundObserver},
    question::Question,
    round::{
        FinishedQuestions, Outcome,
        evaluator::{AnswerEvaluator, PickChange},
        hint::HintService,
        selector::RandomQuestionSelector,
        timer::{Tick, TimerController},
    },
    schedule::{AlarmMessage, Scheduler, TaskSlot},
    score::{PersistentStore, ScoreKeeper, SessionSummary},
    submit::ScoreSubmitter,
};

/// Lifecycle phase of the round engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No session is running
    Idle,
    /// A question is shown and accepts picks
    QuestionActive,
    /// The accepted picks are being judged
    Evaluating,
    /// The outcome of the last question is shown
    Resolution(Outcome),
    /// The session ended, waiting for a restart
    Finished,
}

/// Requests coming from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    /// Pick or toggle the answer at this index of the active question
    PickAnswer(usize),
    /// Lock in the current picks
    Accept,
    /// Spend the 50/50 hint
    Hint,
    /// Start the session over at the current level
    Restart,
    /// Leave the game
    Quit,
}

/// Snapshot of the round state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundState {
    /// Index of the question on screen, if any
    pub current_question: Option<usize>,
    /// Level the session is played on
    pub level: u32,
    /// Score gathered in the session
    pub session_score: i64,
    /// Whether the hint was spent in the session
    pub hint_used: bool,
    /// Lifecycle phase
    pub phase: Phase,
    /// Questions resolved so far, in resolution order
    pub finished: Vec<usize>,
    /// Answers picked on the active question
    pub picked: Vec<usize>,
    /// Outcome tally of the session
    pub summary: SessionSummary,
}

/// External collaborators injected into the engine
pub struct Collaborators {
    /// Supplies the questions of each level
    pub bank: Box<dyn QuestionBank>,
    /// Persists the high score
    pub store: Box<dyn PersistentStore>,
    /// Receives finished-session scores
    pub submitter: Box<dyn ScoreSubmitter>,
    /// Delivers alarms back to the engine
    pub scheduler: Box<dyn Scheduler>,
}

/// Orchestrates selection, picks, countdown, hint and scoring
pub struct RoundEngine {
    config: GameConfig,

    bank: Box<dyn QuestionBank>,
    store: Box<dyn PersistentStore>,
    submitter: Box<dyn ScoreSubmitter>,
    scheduler: Box<dyn Scheduler>,
    observers: Observers,

    questions: Vec<Question>,
    selector: RandomQuestionSelector,
    evaluator: AnswerEvaluator,
    timer: TimerController,
    hint: HintService,
    score: ScoreKeeper,
    finished: FinishedQuestions,
    transition: TaskSlot,

    current: Option<usize>,
    level: u32,
    phase: Phase,
    startup_highscore: i64,
}

impl std::fmt::Debug for RoundEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundEngine")
            .field("level", &self.level)
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("finished", &self.finished)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

/// Looks up the active question among the loaded ones
fn active_question(questions: &[Question], current: Option<usize>) -> Result<&Question, RoundError> {
    let index = current.ok_or(RoundError::NoActiveQuestion)?;
    questions.get(index).ok_or(RoundError::QuestionOutOfBounds {
        index,
        count: questions.len(),
    })
}

impl RoundEngine {
    /// Creates an idle engine at level 1
    ///
    /// The persisted high score is read once here, see
    /// [`RoundEngine::startup_highscore`].
    pub fn new(config: GameConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            bank,
            store,
            submitter,
            scheduler,
        } = collaborators;

        let mut rng = config.rng();
        let startup_highscore = ScoreKeeper::read_highscore(store.as_ref());
        info!(highscore = startup_highscore, "round engine ready");

        Self {
            selector: RandomQuestionSelector::new(config.selection, rng.fork()),
            evaluator: AnswerEvaluator::new(config.evaluation),
            hint: HintService::new(rng.fork()),
            timer: TimerController::default(),
            score: ScoreKeeper::default(),
            finished: FinishedQuestions::default(),
            transition: TaskSlot::default(),
            observers: Observers::default(),
            questions: Vec::new(),
            current: None,
            level: 1,
            phase: Phase::Idle,
            startup_highscore,
            config,
            bank,
            store,
            submitter,
            scheduler,
        }
    }

    /// Subscribes an observer to every future event
    pub fn subscribe<O: RoundObserver + 'static>(&mut self, observer: O) -> ObserverId {
        self.observers.subscribe(observer)
    }

    /// Unsubscribes an observer
    ///
    /// # Returns
    ///
    /// `false` if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// High score persisted when the engine was created
    pub fn startup_highscore(&self) -> i64 {
        self.startup_highscore
    }

    /// Level the next or current session is played on
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The question on screen, if any
    pub fn active_question(&self) -> Option<&Question> {
        active_question(&self.questions, self.current).ok()
    }

    /// Snapshot of the round state
    pub fn state(&self) -> RoundState {
        RoundState {
            current_question: self.current,
            level: self.level,
            session_score: self.score.session_score(),
            hint_used: self.hint.is_used(),
            phase: self.phase,
            finished: self.finished.indices().to_vec(),
            picked: self.evaluator.picked().to_vec(),
            summary: self.score.summary().clone(),
        }
    }

    /// Number of questions a session on the loaded level resolves
    fn round_length(&self) -> usize {
        constants::round::LENGTH.min(self.questions.len())
    }

    fn announce(&self, event: RoundEvent) {
        self.observers.announce(&event);
    }

    fn reject<T>(&self, operation: &'static str, error: RoundError) -> Result<T, RoundError> {
        warn!(operation, phase = ?self.phase, error = %error, "request rejected");
        Err(error)
    }

    fn require_active(&self, operation: &'static str) -> Result<(), RoundError> {
        if self.phase == Phase::QuestionActive {
            Ok(())
        } else {
            self.reject(operation, RoundError::InvalidPhase(self.phase))
        }
    }

    fn stop_timer(&mut self) {
        if self.timer.stop() {
            self.announce(RoundEvent::TimerStopped);
        }
    }

    /// Starts a new session on `level`
    ///
    /// Any running countdown or pending transition is cancelled. The session
    /// score is reset only on level 1, so scores carry across levels.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::Bank`] when the level cannot be loaded, leaving
    /// the engine idle.
    pub fn start_round(&mut self, level: u32) -> Result<(), RoundError> {
        self.stop_timer();
        self.transition.cancel();
        self.current = None;
        self.evaluator.clear();

        let questions = match self.bank.fetch(level) {
            Ok(questions) => questions,
            Err(e) => {
                self.phase = Phase::Idle;
                error!(level, error = %e, "failed to load questions");
                return Err(e.into());
            }
        };

        self.questions = questions;
        self.level = level;
        self.finished.reset();
        self.selector.reset(self.questions.len());
        self.hint.reset();
        self.score.reset_summary();
        if level == 1 {
            self.score.reset_score();
            self.announce(RoundEvent::ScoreUpdated { score: 0 });
        }

        info!(
            level,
            questions = self.questions.len(),
            length = self.round_length(),
            "session started"
        );

        self.show_next_question()
    }

    /// Starts the session over at the current level
    ///
    /// # Errors
    ///
    /// See [`RoundEngine::start_round`].
    pub fn restart(&mut self) -> Result<(), RoundError> {
        info!(level = self.level, "restart requested");
        self.start_round(self.level)
    }

    /// Ends the game and returns to level 1
    pub fn quit(&mut self) {
        self.stop_timer();
        self.transition.cancel();
        self.evaluator.clear();
        self.current = None;
        self.level = 1;
        self.phase = Phase::Idle;
        info!(score = self.score.session_score(), "quit requested");
    }

    fn show_next_question(&mut self) -> Result<(), RoundError> {
        self.evaluator.clear();

        let Some(index) = self
            .selector
            .next(self.questions.len(), &self.finished, self.current)
        else {
            self.phase = Phase::Idle;
            self.current = None;
            return self.reject("next question", RoundError::NoQuestionLeft);
        };

        self.current = Some(index);
        self.phase = Phase::QuestionActive;
        let question = self.questions[index].clone();
        debug!(question = index, timer = question.timer_seconds, "question shown");

        let timer = question.is_timed().then_some(question.timer_seconds);
        self.announce(RoundEvent::QuestionChanged { question });

        if let Some(total) = timer {
            let (seconds_left, color) = self.timer.start(total, self.scheduler.as_ref());
            self.announce(RoundEvent::TimerTick {
                seconds_left,
                color,
            });
        }

        Ok(())
    }

    /// Picks an answer of the active question
    ///
    /// # Errors
    ///
    /// * [`RoundError::InvalidPhase`] if no question accepts picks
    /// * [`RoundError::AnswerOutOfBounds`] for an unknown answer
    /// * [`RoundError::DuplicatePick`] when re-picking a single-answer pick
    pub fn submit_pick(&mut self, answer: usize) -> Result<PickChange, RoundError> {
        self.require_active("pick")?;

        let change = match active_question(&self.questions, self.current)
            .and_then(|question| self.evaluator.pick(question, answer))
        {
            Ok(change) => change,
            Err(e) => return self.reject("pick", e),
        };

        debug!(answer, picked = ?self.evaluator.picked(), "answer picked");
        match &change {
            PickChange::Picked { reset } => {
                for previous in reset {
                    self.announce(RoundEvent::PickReset { answer: *previous });
                }
            }
            PickChange::Unpicked => self.announce(RoundEvent::PickReset { answer }),
        }

        Ok(change)
    }

    /// Locks in the current picks and resolves the active question
    ///
    /// The resolution carries the question's score value whether or not it
    /// was answered correctly. Unless the session is over, the next question
    /// follows after the configured resolution delay.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::InvalidPhase`] if no question is active.
    pub fn accept(&mut self) -> Result<Outcome, RoundError> {
        self.require_active("accept")?;

        let (index, score_value, correct) = match active_question(&self.questions, self.current) {
            Ok(question) => (
                question.index,
                question.score_value,
                self.evaluator.evaluate(question),
            ),
            Err(e) => return self.reject("accept", e),
        };

        self.stop_timer();
        self.phase = Phase::Evaluating;
        self.finished.insert(index);

        if correct {
            let score = self.score.add_score(i64::from(score_value));
            self.announce(RoundEvent::ScoreUpdated { score });
        }

        let outcome = if self.finished.len() >= self.round_length() {
            Outcome::Finish
        } else if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.score.record(outcome, correct);
        self.phase = Phase::Resolution(outcome);

        info!(
            question = index,
            ?outcome,
            correct,
            score = self.score.session_score(),
            "answer accepted"
        );
        self.announce(RoundEvent::Resolution {
            outcome,
            score_delta: score_value,
        });
        self.announce(RoundEvent::Sound(if correct {
            SoundCue::Correct
        } else {
            SoundCue::Incorrect
        }));

        if outcome == Outcome::Finish {
            self.finish_session();
        } else {
            self.transition
                .replace(self.scheduler.as_ref(), self.config.resolution_delay, |generation| {
                    AlarmMessage::NextQuestion { generation }
                });
        }

        Ok(outcome)
    }

    fn finish_session(&mut self) {
        let commit = self.score.commit_highscore(
            self.store.as_mut(),
            self.submitter.as_ref(),
            &self.config.player_id,
        );

        let finished_level = self.level;
        self.level = if finished_level >= self.config.max_level {
            1
        } else {
            finished_level + 1
        };
        self.current = None;
        self.phase = Phase::Finished;

        info!(
            level = finished_level,
            next_level = self.level,
            score = commit.score,
            new_record = commit.new_record,
            "session finished"
        );
    }

    /// Spends the 50/50 hint on the active question
    ///
    /// # Returns
    ///
    /// The hidden answer indices, or `None` if the hint was already spent
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::InvalidPhase`] if no question is active; the
    /// hint is not consumed then.
    pub fn use_hint(&mut self) -> Result<Option<Vec<usize>>, RoundError> {
        self.require_active("hint")?;

        if self.hint.is_used() {
            debug!("hint already used");
            return Ok(None);
        }

        let hidden = match active_question(&self.questions, self.current) {
            Ok(question) => self.hint.use_hint(question),
            Err(e) => return self.reject("hint", e),
        };

        if let Some(hidden) = &hidden {
            self.announce(RoundEvent::HintApplied {
                hidden: hidden.clone(),
            });
            self.announce(RoundEvent::HintExhausted);
        }

        Ok(hidden)
    }

    /// Handles an alarm delivered by the scheduler
    ///
    /// Alarms of a countdown or transition that was cancelled or replaced
    /// since they were scheduled are dropped.
    pub fn receive_alarm(&mut self, alarm: AlarmMessage) {
        match alarm {
            AlarmMessage::TimerTick { generation } => {
                match self.timer.receive_tick(generation, self.scheduler.as_ref()) {
                    None => debug!(generation, "stale timer tick dropped"),
                    Some(Tick::Running {
                        seconds_left,
                        color,
                    }) => {
                        self.announce(RoundEvent::TimerTick {
                            seconds_left,
                            color,
                        });
                        self.announce(RoundEvent::Sound(SoundCue::Countdown));
                    }
                    Some(Tick::Expired { color }) => {
                        self.announce(RoundEvent::TimerTick {
                            seconds_left: 0,
                            color,
                        });
                        self.announce(RoundEvent::Sound(SoundCue::Countdown));
                        self.announce(RoundEvent::TimerStopped);
                        info!(question = ?self.current, "time is up");
                        // a rejection is already logged by accept
                        let _ = self.accept();
                    }
                }
            }
            AlarmMessage::NextQuestion { generation } => {
                if !self.transition.complete(generation) {
                    debug!(generation, "stale transition dropped");
                    return;
                }
                if matches!(self.phase, Phase::Resolution(_)) {
                    // running out of questions is logged where it is detected
                    let _ = self.show_next_question();
                } else {
                    debug!(phase = ?self.phase, "transition outside resolution ignored");
                }
            }
        }
    }

    /// Applies a UI input
    ///
    /// Rejections are logged by the operation and otherwise ignored.
    pub fn receive_input(&mut self, input: Input) {
        debug!(?input, "input received");
        let result = match input {
            Input::PickAnswer(answer) => self.submit_pick(answer).map(drop),
            Input::Accept => self.accept().map(drop),
            Input::Hint => self.use_hint().map(drop),
            Input::Restart => self.restart(),
            Input::Quit => {
                self.quit();
                Ok(())
            }
        };
        if let Err(e) = result {
            debug!(?input, error = %e, "input had no effect");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        bank::StaticQuestionBank,
        constants::score::HIGHSCORE_KEY,
        error::BankError,
        observer::testing::Recorder,
        question::tests::{multi, single},
        round::{evaluator::EvaluationRule, timer::TimerColor},
        schedule::testing::ManualScheduler,
        score::MemoryStore,
        submit::testing::RecordingSubmitter,
    };

    struct Harness {
        engine: RoundEngine,
        scheduler: ManualScheduler,
        store: MemoryStore,
        submitter: RecordingSubmitter,
        recorder: Recorder,
    }

    impl Harness {
        fn new(bank: StaticQuestionBank) -> Self {
            Self::with(bank, GameConfig::default(), MemoryStore::default())
        }

        fn with(bank: StaticQuestionBank, config: GameConfig, store: MemoryStore) -> Self {
            let scheduler = ManualScheduler::default();
            let submitter = RecordingSubmitter::default();
            let recorder = Recorder::default();
            let mut engine = RoundEngine::new(
                GameConfig {
                    seed: Some(11),
                    ..config
                },
                Collaborators {
                    bank: Box::new(bank),
                    store: Box::new(store.clone()),
                    submitter: Box::new(submitter.clone()),
                    scheduler: Box::new(scheduler.clone()),
                },
            );
            engine.subscribe(recorder.clone());
            Self {
                engine,
                scheduler,
                store,
                submitter,
                recorder,
            }
        }

        fn correct_answer(&self) -> usize {
            self.engine
                .active_question()
                .unwrap()
                .first_correct()
                .unwrap()
        }

        fn answer_correctly(&mut self) -> Outcome {
            let correct = self.correct_answer();
            self.engine.submit_pick(correct).unwrap();
            self.engine.accept().unwrap()
        }

        fn deliver_next(&mut self) {
            let alarm = self.scheduler.pop_live().unwrap();
            assert!(matches!(alarm, AlarmMessage::NextQuestion { .. }));
            self.engine.receive_alarm(alarm);
        }

        fn deliver_tick(&mut self) {
            let alarm = self.scheduler.pop_live().unwrap();
            assert!(matches!(alarm, AlarmMessage::TimerTick { .. }));
            self.engine.receive_alarm(alarm);
        }

        fn live_ticks(&self) -> usize {
            self.scheduler
                .live()
                .iter()
                .filter(|(alarm, _)| matches!(alarm, AlarmMessage::TimerTick { .. }))
                .count()
        }

        fn resolutions(&self) -> Vec<Outcome> {
            self.recorder
                .events()
                .into_iter()
                .filter_map(|event| match event {
                    RoundEvent::Resolution { outcome, .. } => Some(outcome),
                    _ => None,
                })
                .collect()
        }
    }

    fn singles(count: usize) -> Vec<Question> {
        (0..count).map(|index| single(index, index % 4)).collect()
    }

    fn timed(count: usize, seconds: u32) -> Vec<Question> {
        singles(count)
            .into_iter()
            .map(|question| Question {
                timer_seconds: seconds,
                ..question
            })
            .collect()
    }

    fn bank(questions: Vec<Question>) -> StaticQuestionBank {
        StaticQuestionBank::new().with_level(1, questions)
    }

    #[test]
    fn test_full_session_scores_and_commits() {
        let mut h = Harness::new(bank(singles(8)));
        h.engine.start_round(1).unwrap();

        for round in 0..5 {
            let outcome = h.answer_correctly();
            if round < 4 {
                assert_eq!(outcome, Outcome::Correct);
                h.deliver_next();
            } else {
                assert_eq!(outcome, Outcome::Finish);
            }
        }

        let state = h.engine.state();
        assert_eq!(state.session_score, 50);
        assert_eq!(state.phase, Phase::Finished);
        assert_eq!(state.level, 2);
        assert_eq!(state.finished.len(), 5);
        assert_eq!(state.summary.outcomes[Outcome::Correct], 4);
        assert_eq!(state.summary.outcomes[Outcome::Finish], 1);
        assert_eq!(state.summary.correct_answers, 5);
        assert_eq!(h.store.get_highscore(HIGHSCORE_KEY).unwrap(), 50);
        assert_eq!(h.submitter.submissions(), vec![("1".to_owned(), 50)]);
        assert!(h.scheduler.live().is_empty());
    }

    #[test]
    fn test_questions_never_repeat_within_session() {
        for seed in 0..20 {
            let mut h = Harness::with(
                bank(singles(6)),
                GameConfig::default(),
                MemoryStore::default(),
            );
            h.engine.selector = RandomQuestionSelector::new(
                h.engine.config.selection,
                fastrand::Rng::with_seed(seed),
            );
            h.engine.start_round(1).unwrap();

            let mut seen = HashSet::new();
            loop {
                assert!(seen.insert(h.engine.state().current_question.unwrap()));
                h.engine.accept().unwrap();
                assert!(h.engine.state().finished.len() <= constants::round::LENGTH);
                if h.engine.phase() == Phase::Finished {
                    break;
                }
                h.deliver_next();
            }
            assert_eq!(seen.len(), 5);
        }
    }

    #[test]
    fn test_small_bank_finishes_early() {
        let mut h = Harness::new(bank(singles(3)));
        h.engine.start_round(1).unwrap();

        assert_eq!(h.engine.accept().unwrap(), Outcome::Incorrect);
        h.deliver_next();
        assert_eq!(h.engine.accept().unwrap(), Outcome::Incorrect);
        h.deliver_next();
        assert_eq!(h.engine.accept().unwrap(), Outcome::Finish);
        assert_eq!(h.submitter.submissions(), vec![("1".to_owned(), 0)]);
    }

    #[test]
    fn test_single_pick_replaces_and_resets() {
        let mut h = Harness::new(bank(singles(5)));
        h.engine.start_round(1).unwrap();

        h.engine.submit_pick(0).unwrap();
        h.engine.submit_pick(2).unwrap();

        assert_eq!(h.engine.state().picked, vec![2]);
        assert!(h.recorder.events().contains(&RoundEvent::PickReset { answer: 0 }));
        assert_eq!(h.engine.submit_pick(2), Err(RoundError::DuplicatePick(2)));
        assert_eq!(h.engine.state().picked, vec![2]);
    }

    #[test]
    fn test_multi_pick_toggles() {
        let questions = (0..5).map(|index| multi(index, &[1, 3])).collect();
        let mut h = Harness::new(bank(questions));
        h.engine.start_round(1).unwrap();

        h.engine.submit_pick(1).unwrap();
        h.engine.submit_pick(3).unwrap();
        assert_eq!(h.engine.submit_pick(3), Ok(PickChange::Unpicked));
        assert_eq!(h.engine.state().picked, vec![1]);
        h.engine.submit_pick(3).unwrap();

        assert_eq!(h.engine.accept().unwrap(), Outcome::Correct);
        assert_eq!(h.engine.state().session_score, 10);
    }

    #[test]
    fn test_exact_match_rule_rejects_extra_picks() {
        let questions = (0..5).map(|index| multi(index, &[1, 3])).collect();
        let mut h = Harness::with(
            bank(questions),
            GameConfig {
                evaluation: EvaluationRule::ExactMatch,
                ..GameConfig::default()
            },
            MemoryStore::default(),
        );
        h.engine.start_round(1).unwrap();

        for answer in [0, 1, 3] {
            h.engine.submit_pick(answer).unwrap();
        }
        assert_eq!(h.engine.accept().unwrap(), Outcome::Incorrect);
    }

    #[test]
    fn test_empty_accept_is_incorrect_with_full_delta() {
        let mut h = Harness::new(bank(singles(5)));
        h.engine.start_round(1).unwrap();

        assert_eq!(h.engine.accept().unwrap(), Outcome::Incorrect);
        assert_eq!(h.engine.state().session_score, 0);
        assert!(h.recorder.events().contains(&RoundEvent::Resolution {
            outcome: Outcome::Incorrect,
            score_delta: 10
        }));
        assert!(h
            .recorder
            .events()
            .contains(&RoundEvent::Sound(SoundCue::Incorrect)));
    }

    #[test]
    fn test_requests_outside_active_question_are_rejected() {
        let mut h = Harness::new(bank(singles(5)));
        assert_eq!(h.engine.accept(), Err(RoundError::InvalidPhase(Phase::Idle)));
        assert_eq!(h.engine.submit_pick(0), Err(RoundError::InvalidPhase(Phase::Idle)));

        h.engine.start_round(1).unwrap();
        h.engine.accept().unwrap();
        let resolution = Phase::Resolution(Outcome::Incorrect);
        assert_eq!(h.engine.submit_pick(0), Err(RoundError::InvalidPhase(resolution)));
        assert_eq!(h.engine.accept(), Err(RoundError::InvalidPhase(resolution)));
        assert_eq!(h.engine.state().finished.len(), 1);
    }

    #[test]
    fn test_unknown_answer_is_rejected() {
        let mut h = Harness::new(bank(singles(5)));
        h.engine.start_round(1).unwrap();
        let question = h.engine.state().current_question.unwrap();

        assert_eq!(
            h.engine.submit_pick(7),
            Err(RoundError::AnswerOutOfBounds {
                question,
                answer: 7
            })
        );
        assert!(h.engine.state().picked.is_empty());
    }

    #[test]
    fn test_hint_is_used_once_per_session() {
        let mut h = Harness::new(bank(singles(5)));
        assert_eq!(h.engine.use_hint(), Err(RoundError::InvalidPhase(Phase::Idle)));
        assert!(!h.engine.state().hint_used);

        h.engine.start_round(1).unwrap();
        let correct = h.correct_answer();
        let hidden = h.engine.use_hint().unwrap().unwrap();
        assert_eq!(hidden.len(), 2);
        assert!(!hidden.contains(&correct));
        assert_eq!(h.engine.use_hint(), Ok(None));

        h.engine.accept().unwrap();
        h.deliver_next();
        assert_eq!(h.engine.use_hint(), Ok(None));

        let events = h.recorder.events();
        let applied = events
            .iter()
            .filter(|event| matches!(event, RoundEvent::HintApplied { .. }))
            .count();
        let exhausted = events
            .iter()
            .filter(|event| **event == RoundEvent::HintExhausted)
            .count();
        assert_eq!((applied, exhausted), (1, 1));

        h.engine.restart().unwrap();
        assert!(!h.engine.state().hint_used);
    }

    #[test]
    fn test_timer_expiry_auto_accepts_once() {
        let mut h = Harness::new(bank(timed(5, 3)));
        h.engine.start_round(1).unwrap();
        assert!(h.recorder.events().contains(&RoundEvent::TimerTick {
            seconds_left: 3,
            color: TimerColor::Default
        }));

        h.deliver_tick();
        h.deliver_tick();
        let expiring = h.scheduler.pop_live().unwrap();
        h.engine.receive_alarm(expiring);

        assert_eq!(h.engine.phase(), Phase::Resolution(Outcome::Incorrect));
        assert_eq!(h.live_ticks(), 0);

        h.engine.receive_alarm(expiring);
        assert_eq!(h.resolutions(), vec![Outcome::Incorrect]);
        assert_eq!(h.engine.state().finished.len(), 1);
    }

    #[test]
    fn test_manual_accept_cancels_countdown() {
        let mut h = Harness::new(bank(timed(5, 10)));
        h.engine.start_round(1).unwrap();
        h.deliver_tick();
        let pending = h.scheduler.live()[0].0;

        h.answer_correctly();
        assert!(h.recorder.events().contains(&RoundEvent::TimerStopped));
        assert_eq!(h.live_ticks(), 0);

        h.engine.receive_alarm(pending);
        assert_eq!(h.resolutions(), vec![Outcome::Correct]);
    }

    #[test]
    fn test_every_question_runs_a_single_countdown() {
        let mut h = Harness::new(bank(timed(5, 5)));
        h.engine.start_round(1).unwrap();
        assert_eq!(h.live_ticks(), 1);

        h.engine.start_round(1).unwrap();
        assert_eq!(h.live_ticks(), 1);

        h.deliver_tick();
        h.engine.accept().unwrap();
        h.deliver_next();
        assert_eq!(h.live_ticks(), 1);
        assert_eq!(h.engine.state().finished.len(), 1);
    }

    #[test]
    fn test_stale_transition_is_ignored() {
        let mut h = Harness::new(bank(singles(5)));
        h.engine.start_round(1).unwrap();
        h.engine.accept().unwrap();
        let stale = h.scheduler.pop_live().unwrap();

        h.engine.restart().unwrap();
        let shown = h.engine.state().current_question;
        h.engine.receive_alarm(stale);

        assert_eq!(h.engine.phase(), Phase::QuestionActive);
        assert_eq!(h.engine.state().current_question, shown);
        assert!(h.engine.state().finished.is_empty());
    }

    #[test]
    fn test_level_wraps_after_max_level() {
        let bank = StaticQuestionBank::new()
            .with_level(1, singles(5))
            .with_level(2, singles(5));
        let mut h = Harness::with(
            bank,
            GameConfig {
                max_level: 2,
                ..GameConfig::default()
            },
            MemoryStore::default(),
        );

        for expected_next in [2, 1] {
            h.engine.start_round(h.engine.level()).unwrap();
            while h.engine.accept().unwrap() != Outcome::Finish {
                h.deliver_next();
            }
            assert_eq!(h.engine.level(), expected_next);
        }
    }

    #[test]
    fn test_restart_resets_score_only_on_level_one() {
        let bank = StaticQuestionBank::new()
            .with_level(1, singles(5))
            .with_level(2, singles(5));
        let mut h = Harness::new(bank);

        h.engine.start_round(1).unwrap();
        h.answer_correctly();
        h.engine.restart().unwrap();
        assert_eq!(h.engine.state().session_score, 0);

        h.engine.start_round(2).unwrap();
        h.answer_correctly();
        h.engine.restart().unwrap();
        assert_eq!(h.engine.state().session_score, 10);
        assert_eq!(h.engine.level(), 2);
    }

    #[test]
    fn test_quit_cancels_everything() {
        let mut h = Harness::new(bank(timed(5, 5)));
        h.engine.start_round(1).unwrap();
        h.engine.accept().unwrap();
        assert!(!h.scheduler.live().is_empty());

        h.engine.quit();

        assert!(h.scheduler.live().is_empty());
        assert_eq!(h.engine.phase(), Phase::Idle);
        assert_eq!(h.engine.level(), 1);
        assert_eq!(h.engine.state().current_question, None);
    }

    #[test]
    fn test_empty_bank_leaves_engine_idle() {
        let mut h = Harness::new(StaticQuestionBank::new());
        assert_eq!(
            h.engine.start_round(1),
            Err(RoundError::Bank(BankError::Empty(1)))
        );
        assert_eq!(h.engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_startup_highscore_and_lower_session() {
        let mut h = Harness::with(
            bank(singles(5)),
            GameConfig::default(),
            MemoryStore::with_value(HIGHSCORE_KEY, 70),
        );
        assert_eq!(h.engine.startup_highscore(), 70);

        h.engine.start_round(1).unwrap();
        while h.answer_correctly() != Outcome::Finish {
            h.deliver_next();
        }

        assert_eq!(h.store.get_highscore(HIGHSCORE_KEY).unwrap(), 70);
        assert_eq!(h.submitter.submissions(), vec![("1".to_owned(), 50)]);
    }

    #[test]
    fn test_inputs_drive_the_engine() {
        let mut h = Harness::new(bank(singles(5)));
        h.engine.start_round(1).unwrap();
        let correct = h.correct_answer();

        h.engine.receive_input(Input::PickAnswer(correct));
        h.engine.receive_input(Input::PickAnswer(correct));
        h.engine.receive_input(Input::Accept);
        h.engine.receive_input(Input::Accept);

        assert_eq!(h.resolutions(), vec![Outcome::Correct]);
        assert_eq!(h.engine.state().session_score, 10);

        h.engine.receive_input(Input::Quit);
        assert_eq!(h.engine.phase(), Phase::Idle);
    }
}
