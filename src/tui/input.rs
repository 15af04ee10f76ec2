use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use patchgrid::shared::InputEvent;
use super::mode::TuiState;

// poll for input from tui, resolves keys and clicks into input events
// for the grid to handle. clicks need the projection from the last frame
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(handle_key(key.code, ts)),
        Event::Mouse(mouse) => Ok(handle_mouse(mouse.kind, mouse.column, mouse.row, ts)),
        _ => Ok(vec![]),
    }
}

fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Backspace => vec![InputEvent::DeletePatch],

        // note names pick the pitch class
        KeyCode::Char(c @ ('c' | 'd' | 'e' | 'f' | 'g' | 'a' | 'b')) => {
            char_to_pitch(c).map(InputEvent::SetPitch).into_iter().collect()
        }
        KeyCode::Char(c @ ('1' | '2' | '3' | '4')) => {
            vec![InputEvent::SetPattern(c as u8 - b'1')]
        }

        KeyCode::Char('l') => vec![InputEvent::ToggleLayer],
        KeyCode::Char('i') => vec![InputEvent::CycleBackground],
        KeyCode::Char('?') => { ts.show_help = !ts.show_help; vec![] }

        _ => vec![],
    }
}

// only the release counts as a click, a drag off the grid cancels it
fn handle_mouse(kind: MouseEventKind, column: u16, row: u16, ts: &TuiState) -> Vec<InputEvent> {
    if kind != MouseEventKind::Up(MouseButton::Left) {
        return vec![];
    }
    ts.projection
        .and_then(|p| p.to_world(column, row))
        .map(InputEvent::Pointer)
        .into_iter()
        .collect()
}

fn char_to_pitch(c: char) -> Option<u8> {
    match c {
        'c' => Some(0),
        'd' => Some(1),
        'e' => Some(2),
        'f' => Some(3),
        'g' => Some(4),
        'a' => Some(5),
        'b' => Some(6),
        _ => None,
    }
}
