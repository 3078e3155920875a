use crate::config::SwipeConfig;
use crate::data::Card;
use crate::gesture::{
    follow_transform, Direction, DragState, GestureEvent, GestureOutput, Offset, Transform,
};
use crate::notify::{Notification, NotificationSink};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A finalized swipe on one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub direction: Direction,
    pub card_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeOutcome {
    pub card: Card,
    pub direction: Direction,
    pub swipe_count: u32,
    pub prompt_opened: bool,
}

/// Card that was just swiped away and is still animating out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitingCard {
    pub card: Card,
    pub direction: Direction,
    pub from: Transform,
    pub to: Transform,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPrompt {
    pub choices: Vec<String>,
    pub opened_at: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardPhase {
    Pending,
    Active,
    Dragging,
    Exiting,
}

/// Session state of the swipe deck.
///
/// Only the front card is interactive. A decision removes it, bumps the
/// swipe counter and dispatches the direction's effect; every
/// `prompt_interval` swipes the skill prompt opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckController {
    deck: VecDeque<Card>,
    saved: Vec<Card>,
    swipe_count: u32,
    prompt: Option<SkillPrompt>,
    drag: Option<DragState>,
    exiting: Option<ExitingCard>,
    #[serde(skip, default)]
    config: SwipeConfig,
}

impl DeckController {
    pub fn new(cards: Vec<Card>, config: &SwipeConfig) -> Self {
        Self {
            deck: cards.into(),
            saved: Vec::new(),
            swipe_count: 0,
            prompt: None,
            drag: None,
            exiting: None,
            config: config.clone(),
        }
    }

    pub fn deck(&self) -> &VecDeque<Card> {
        &self.deck
    }

    pub fn front(&self) -> Option<&Card> {
        self.deck.front()
    }

    /// Cards to render, front first.
    pub fn visible(&self) -> impl Iterator<Item = &Card> {
        self.deck.iter().take(self.config.visible_cards)
    }

    pub fn saved(&self) -> &[Card] {
        &self.saved
    }

    pub fn swipe_count(&self) -> u32 {
        self.swipe_count
    }

    pub fn prompt(&self) -> Option<&SkillPrompt> {
        self.prompt.as_ref()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn exiting(&self) -> Option<&ExitingCard> {
        self.exiting.as_ref()
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    pub fn is_exhausted(&self) -> bool {
        self.deck.is_empty()
    }

    /// Whether `card_id` may start a drag right now.
    pub fn accepts_gestures(&self, card_id: &str) -> bool {
        self.prompt.is_none()
            && self
                .front()
                .map(|card| card.id == card_id)
                .unwrap_or(false)
    }

    pub fn phase_of(&self, card_id: &str) -> Option<CardPhase> {
        if self
            .exiting
            .as_ref()
            .map(|exiting| exiting.card.id == card_id)
            .unwrap_or(false)
        {
            return Some(CardPhase::Exiting);
        }

        let position = self.deck.iter().position(|card| card.id == card_id)?;
        if position > 0 {
            return Some(CardPhase::Pending);
        }

        match &self.drag {
            Some(drag) if drag.card_id == card_id => Some(CardPhase::Dragging),
            _ => Some(CardPhase::Active),
        }
    }

    /// Transform for the front card: follows the drag, otherwise at origin.
    pub fn active_transform(&self) -> Transform {
        match &self.drag {
            Some(drag) => follow_transform(drag.offset, &self.config),
            None => Transform::ORIGIN,
        }
    }

    pub fn pointer_down(
        &mut self,
        card_id: &str,
        pointer_id: i32,
        x: f64,
        y: f64,
        timestamp: f64,
    ) -> bool {
        if self.drag.is_some() || !self.accepts_gestures(card_id) {
            return false;
        }
        self.drag = Some(DragState::begin(pointer_id, card_id, x, y, timestamp));
        true
    }

    pub fn pointer_move(
        &mut self,
        pointer_id: i32,
        x: f64,
        y: f64,
        timestamp: f64,
    ) -> Option<Transform> {
        let config = &self.config;
        let drag = self.drag.as_mut().filter(|drag| drag.pointer_id == pointer_id)?;
        let offset = drag.offset_to(x, y);
        match drag.handle(GestureEvent::Move { offset, timestamp }, config) {
            GestureOutput::Follow(transform) => Some(transform),
            _ => None,
        }
    }

    /// Ends the drag for `pointer_id`. A qualifying release is applied to
    /// the deck; anything else springs the card back.
    pub fn pointer_up(
        &mut self,
        pointer_id: i32,
        x: f64,
        y: f64,
        timestamp: f64,
        sink: &mut impl NotificationSink,
    ) -> Option<GestureOutput> {
        if self.drag.as_ref()?.pointer_id != pointer_id {
            return None;
        }
        let mut drag = self.drag.take()?;

        // The release position is the last sample of the drag.
        let offset = drag.offset_to(x, y);
        drag.handle(GestureEvent::Move { offset, timestamp }, &self.config);
        let from = follow_transform(offset, &self.config);
        let output = drag.handle(
            GestureEvent::Release {
                offset,
                velocity: drag.velocity(),
            },
            &self.config,
        );

        match output {
            GestureOutput::Swipe { direction, exit } => {
                let decision = Decision {
                    direction,
                    card_id: drag.card_id.clone(),
                };
                if let Some(outcome) = self.apply_decision(&decision, sink) {
                    self.exiting = Some(ExitingCard {
                        card: outcome.card,
                        direction,
                        from,
                        to: exit,
                    });
                }
            }
            GestureOutput::ReturnToOrigin => {
                debug!(
                    "Drag on {} released at ({:.0}, {:.0}); returning to origin",
                    drag.card_id, offset.dx, offset.dy
                );
            }
            _ => {}
        }

        Some(output)
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32) -> bool {
        match &self.drag {
            Some(drag) if drag.pointer_id == pointer_id => {
                self.drag = None;
                true
            }
            _ => false,
        }
    }

    /// Applies a finalized decision to the front card.
    ///
    /// Returns `None` and leaves everything untouched when the deck is empty
    /// or the decision is for a card other than the front one.
    pub fn apply_decision(
        &mut self,
        decision: &Decision,
        sink: &mut impl NotificationSink,
    ) -> Option<SwipeOutcome> {
        match self.front() {
            Some(card) if card.id == decision.card_id => {}
            Some(card) => {
                warn!(
                    "Ignoring {} decision for {}; front card is {}",
                    decision.direction.as_str(),
                    decision.card_id,
                    card.id
                );
                return None;
            }
            None => {
                warn!("Ignoring decision for {}; deck is empty", decision.card_id);
                return None;
            }
        }

        let card = self.deck.pop_front()?;
        self.swipe_count = self.swipe_count.saturating_add(1);
        info!(
            "Swiped {} on {} (swipe #{})",
            decision.direction.as_str(),
            card.id,
            self.swipe_count
        );

        match decision.direction {
            Direction::Right => {
                self.saved.push(card.clone());
                sink.notify(Notification::success(format!(
                    "Added {} to Possible Partners",
                    card.name
                )));
            }
            Direction::Left => {
                sink.notify(Notification::error(format!("Passed on {}", card.name)));
            }
            Direction::Up => {
                sink.notify(Notification::success(format!(
                    "Opening details for {}...",
                    card.name
                )));
            }
            Direction::Down => {
                sink.notify(Notification::success(format!(
                    "Finding matches similar to {}...",
                    card.name
                )));
            }
        }

        let prompt_opened = self.swipe_count % self.config.prompt_interval.max(1) == 0;
        if prompt_opened {
            info!("Opening skill prompt after {} swipes", self.swipe_count);
            self.prompt = Some(SkillPrompt {
                choices: self.config.skill_priorities.clone(),
                opened_at: self.swipe_count,
            });
        }

        Some(SwipeOutcome {
            card,
            direction: decision.direction,
            swipe_count: self.swipe_count,
            prompt_opened,
        })
    }

    /// Closes the skill prompt. `Some(index)` picks a skill, `None` skips.
    /// The deck and saved list are not affected either way.
    pub fn resolve_prompt(
        &mut self,
        choice: Option<usize>,
        sink: &mut impl NotificationSink,
    ) -> Option<String> {
        let prompt = self.prompt.take()?;
        let picked = choice.and_then(|index| prompt.choices.get(index).cloned());
        match &picked {
            Some(skill) => {
                info!("Skill priority picked: {}", skill);
                sink.notify(Notification::success(format!("Prioritizing {}", skill)));
            }
            None => debug!("Skill prompt skipped"),
        }
        picked
    }

    /// Clears the exiting card once its animation has finished.
    pub fn finish_exit(&mut self, card_id: &str) -> bool {
        match &self.exiting {
            Some(exiting) if exiting.card.id == card_id => {
                self.exiting = None;
                true
            }
            _ => false,
        }
    }

    pub fn drag_offset(&self) -> Option<Offset> {
        self.drag.as_ref().map(|drag| drag.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Category;

    fn card(id: &str) -> Card {
        Card {
            id: id.to_string(),
            name: format!("Name {}", id),
            category: Category::Individual,
            skills: vec!["Rust".to_string()],
            description: String::new(),
        }
    }

    fn controller(ids: &[&str]) -> DeckController {
        DeckController::new(ids.iter().map(|id| card(id)).collect(), &SwipeConfig::default())
    }

    fn ids(deck: &DeckController) -> Vec<String> {
        deck.deck().iter().map(|card| card.id.clone()).collect()
    }

    fn decide(direction: Direction, card_id: &str) -> Decision {
        Decision {
            direction,
            card_id: card_id.to_string(),
        }
    }

    #[test]
    fn right_drag_saves_front_card() {
        let mut deck = controller(&["A", "B", "C", "D", "E"]);
        let mut notes = Vec::new();

        assert!(deck.pointer_down("A", 7, 100.0, 100.0, 0.0));
        let out = deck.pointer_up(7, 250.0, 100.0, 2000.0, &mut notes);

        assert!(matches!(
            out,
            Some(GestureOutput::Swipe {
                direction: Direction::Right,
                ..
            })
        ));
        assert_eq!(ids(&deck), vec!["B", "C", "D", "E"]);
        assert_eq!(deck.saved().len(), 1);
        assert_eq!(deck.saved()[0].id, "A");
        assert_eq!(deck.swipe_count(), 1);
        assert!(deck.prompt().is_none());
        assert_eq!(notes, vec![Notification::success("Added Name A to Possible Partners")]);
        assert_eq!(deck.exiting().map(|e| e.card.id.as_str()), Some("A"));
        assert!(deck.drag().is_none());
    }

    #[test]
    fn short_drag_returns_without_mutation() {
        let mut deck = controller(&["A", "B"]);
        let mut notes = Vec::new();

        assert!(deck.pointer_down("A", 1, 0.0, 0.0, 0.0));
        deck.pointer_move(1, 40.0, 20.0, 500.0);
        let out = deck.pointer_up(1, 60.0, 20.0, 1000.0, &mut notes);

        assert_eq!(out, Some(GestureOutput::ReturnToOrigin));
        assert_eq!(ids(&deck), vec!["A", "B"]);
        assert_eq!(deck.swipe_count(), 0);
        assert!(notes.is_empty());
        assert_eq!(deck.active_transform(), Transform::ORIGIN);
    }

    #[test]
    fn fast_flick_swipes_under_distance_threshold() {
        let mut deck = controller(&["A", "B"]);
        let mut notes = Vec::new();

        deck.pointer_down("A", 1, 0.0, 0.0, 0.0);
        deck.pointer_move(1, -20.0, 0.0, 16.0);
        let out = deck.pointer_up(1, -40.0, 0.0, 32.0, &mut notes);

        assert!(matches!(
            out,
            Some(GestureOutput::Swipe {
                direction: Direction::Left,
                ..
            })
        ));
        assert!(deck.saved().is_empty());
        assert_eq!(notes, vec![Notification::error("Passed on Name A")]);
    }

    #[test]
    fn fast_drag_then_pause_springs_back() {
        let mut deck = controller(&["A", "B"]);
        let mut notes = Vec::new();

        assert!(deck.pointer_down("A", 1, 0.0, 0.0, 0.0));
        deck.pointer_move(1, 45.0, 0.0, 30.0);
        deck.pointer_move(1, 90.0, 0.0, 60.0);
        let out = deck.pointer_up(1, 90.0, 0.0, 2060.0, &mut notes);

        assert_eq!(out, Some(GestureOutput::ReturnToOrigin));
        assert_eq!(ids(&deck), vec!["A", "B"]);
        assert!(deck.saved().is_empty());
        assert_eq!(deck.swipe_count(), 0);
        assert!(notes.is_empty());
    }

    #[test]
    fn slow_steady_drag_under_threshold_springs_back() {
        let mut deck = controller(&["A", "B"]);
        let mut notes = Vec::new();

        assert!(deck.pointer_down("A", 1, 0.0, 0.0, 0.0));
        for step in 1..=80 {
            let t = step as f64 * 16.0;
            deck.pointer_move(1, step as f64, 0.0, t);
        }
        let out = deck.pointer_up(1, 80.0, 0.0, 81.0 * 16.0, &mut notes);

        assert_eq!(out, Some(GestureOutput::ReturnToOrigin));
        assert_eq!(ids(&deck), vec!["A", "B"]);
        assert_eq!(deck.swipe_count(), 0);
    }

    #[test]
    fn second_release_is_ignored() {
        let mut deck = controller(&["A", "B", "C"]);
        let mut notes = Vec::new();

        deck.pointer_down("A", 1, 0.0, 0.0, 0.0);
        deck.pointer_up(1, 0.0, -200.0, 1000.0, &mut notes);
        assert_eq!(deck.pointer_up(1, 0.0, -200.0, 1001.0, &mut notes), None);

        assert_eq!(ids(&deck), vec!["B", "C"]);
        assert_eq!(deck.swipe_count(), 1);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn duplicate_decision_mutates_once() {
        let mut deck = controller(&["A", "B"]);
        let mut notes = Vec::new();
        let decision = decide(Direction::Right, "A");

        assert!(deck.apply_decision(&decision, &mut notes).is_some());
        assert!(deck.apply_decision(&decision, &mut notes).is_none());
        assert_eq!(ids(&deck), vec!["B"]);
        assert_eq!(deck.saved().len(), 1);
    }

    #[test]
    fn only_front_card_accepts_gestures() {
        let mut deck = controller(&["A", "B"]);
        assert!(!deck.pointer_down("B", 1, 0.0, 0.0, 0.0));
        assert!(deck.drag().is_none());

        assert!(deck.pointer_down("A", 1, 0.0, 0.0, 0.0));
        assert!(!deck.pointer_down("A", 2, 0.0, 0.0, 0.0));
        assert_eq!(deck.pointer_move(2, 50.0, 0.0, 10.0), None);
        assert_eq!(deck.phase_of("A"), Some(CardPhase::Dragging));
        assert_eq!(deck.phase_of("B"), Some(CardPhase::Pending));
    }

    #[test]
    fn direction_effects() {
        let mut deck = controller(&["A", "B", "C", "D"]);
        let mut notes = Vec::new();
        deck.apply_decision(&decide(Direction::Left, "A"), &mut notes);
        deck.apply_decision(&decide(Direction::Up, "B"), &mut notes);
        deck.apply_decision(&decide(Direction::Down, "C"), &mut notes);

        assert!(deck.saved().is_empty());
        assert_eq!(ids(&deck), vec!["D"]);
        let messages: Vec<_> = notes.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Passed on Name A",
                "Opening details for Name B...",
                "Finding matches similar to Name C...",
            ]
        );
    }

    #[test]
    fn prompt_opens_every_fifth_swipe() {
        let names: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut deck = controller(&refs);
        let mut notes = Vec::new();
        let mut opened_at = Vec::new();

        for id in &refs[..10] {
            let outcome = deck
                .apply_decision(&decide(Direction::Right, id), &mut notes)
                .unwrap();
            if outcome.prompt_opened {
                opened_at.push(outcome.swipe_count);
                deck.resolve_prompt(None, &mut notes);
            }
        }

        assert_eq!(opened_at, vec![5, 10]);
        assert_eq!(deck.swipe_count(), 10);
    }

    #[test]
    fn five_right_swipes_show_prompt_once() {
        let mut deck = controller(&["A", "B", "C", "D", "E", "F"]);
        let mut notes = Vec::new();

        for (i, id) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            assert!(deck.prompt().is_none(), "prompt open before swipe {}", i + 1);
            deck.apply_decision(&decide(Direction::Right, id), &mut notes);
        }

        let prompt = deck.prompt().unwrap();
        assert_eq!(prompt.opened_at, 5);
        assert_eq!(prompt.choices.len(), 3);
        assert_eq!(deck.saved().len(), 5);
        assert!(!deck.accepts_gestures("F"));
    }

    #[test]
    fn resolving_prompt_leaves_deck_alone() {
        let mut deck = controller(&["A", "B", "C", "D", "E", "F", "G"]);
        let mut notes = Vec::new();
        for id in ["A", "B", "C", "D", "E"] {
            deck.apply_decision(&decide(Direction::Left, id), &mut notes);
        }
        notes.clear();

        let picked = deck.resolve_prompt(Some(1), &mut notes);
        assert_eq!(picked.as_deref(), Some("Backend Development"));
        assert_eq!(notes, vec![Notification::success("Prioritizing Backend Development")]);
        assert!(deck.prompt().is_none());
        assert_eq!(ids(&deck), vec!["F", "G"]);
        assert!(deck.saved().is_empty());
        assert!(deck.accepts_gestures("F"));

        assert_eq!(deck.resolve_prompt(None, &mut notes), None);
    }

    #[test]
    fn empty_deck_ignores_everything() {
        let mut deck = controller(&[]);
        let mut notes = Vec::new();

        assert!(deck.is_exhausted());
        assert!(!deck.pointer_down("A", 1, 0.0, 0.0, 0.0));
        assert_eq!(deck.pointer_up(1, 300.0, 0.0, 10.0, &mut notes), None);
        assert!(deck
            .apply_decision(&decide(Direction::Right, "A"), &mut notes)
            .is_none());
        assert_eq!(deck.swipe_count(), 0);
        assert!(notes.is_empty());
    }

    #[test]
    fn exit_clears_after_animation() {
        let mut deck = controller(&["A", "B"]);
        let mut notes = Vec::new();
        deck.pointer_down("A", 1, 0.0, 0.0, 0.0);
        deck.pointer_up(1, 0.0, 180.0, 1000.0, &mut notes);

        assert_eq!(deck.phase_of("A"), Some(CardPhase::Exiting));
        assert_eq!(deck.phase_of("B"), Some(CardPhase::Active));
        assert!(!deck.finish_exit("B"));
        assert!(deck.finish_exit("A"));
        assert_eq!(deck.phase_of("A"), None);
    }

    #[test]
    fn cancel_drops_drag_without_decision() {
        let mut deck = controller(&["A"]);
        deck.pointer_down("A", 3, 0.0, 0.0, 0.0);
        deck.pointer_move(3, 500.0, 0.0, 10.0);
        assert!(!deck.pointer_cancel(4));
        assert!(deck.pointer_cancel(3));
        assert_eq!(ids(&deck), vec!["A"]);
        assert_eq!(deck.active_transform(), Transform::ORIGIN);
    }

    #[test]
    fn visible_is_limited_to_configured_cards() {
        let deck = controller(&["A", "B", "C"]);
        let visible: Vec<_> = deck.visible().map(|card| card.id.as_str()).collect();
        assert_eq!(visible, vec!["A", "B"]);
    }

    #[test]
    fn state_serializes() {
        let mut deck = controller(&["A", "B"]);
        deck.pointer_down("A", 1, 0.0, 0.0, 0.0);
        let json = serde_json::to_string(&deck).unwrap();
        assert!(json.contains("\"swipe_count\":0"));
        assert!(json.contains("\"drag\":{"));
    }
}
