use eframe::egui;
use std::time::Instant;

use crate::metronome::Metronome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Toggle,
    Increment,
    Decrement,
}

pub fn action_for_key(key: egui::Key) -> Option<KeyAction> {
    match key {
        egui::Key::Space | egui::Key::Enter => Some(KeyAction::Toggle),
        egui::Key::ArrowUp | egui::Key::ArrowRight => Some(KeyAction::Increment),
        egui::Key::ArrowDown | egui::Key::ArrowLeft => Some(KeyAction::Decrement),
        _ => None,
    }
}

/// Pull this frame's presses of the bound keys out of the input queue, in the
/// order they happened. Removed events never reach focused widgets, so Space
/// won't also click a button. Held keys repeat for tempo changes only.
pub fn take_actions(ctx: &egui::Context) -> Vec<KeyAction> {
    ctx.input_mut(|input| {
        let mut actions = Vec::new();

        input.events.retain(|event| match event {
            egui::Event::Key {
                key,
                pressed: true,
                repeat,
                modifiers,
                ..
            } if modifiers.is_none() => match action_for_key(*key) {
                Some(KeyAction::Toggle) if *repeat => false,
                Some(action) => {
                    actions.push(action);
                    false
                }
                None => true,
            },
            _ => true,
        });

        actions
    })
}

pub fn apply(action: KeyAction, metronome: &mut Metronome, now: Instant) {
    match action {
        KeyAction::Toggle => metronome.toggle(now),
        KeyAction::Increment => {
            metronome.increment_bpm();
        }
        KeyAction::Decrement => {
            metronome.decrement_bpm();
        }
    }
}
