//! Gesture scripts: a recorded sequence of pointer and editor commands.
//!
//! A script is a JSON array of steps tagged by `op`. Blocks are referenced
//! either by id or by their index in flow order, so hand-written scripts do
//! not need to know generated ids.
//!
//! ```json
//! [
//!   { "op": "down", "block": 0, "x": 100, "y": 100 },
//!   { "op": "move", "x": 120, "y": 90 },
//!   { "op": "up" },
//!   { "op": "down", "block": 0, "x": 470, "y": 340, "handle": "se" },
//!   { "op": "move", "x": 520, "y": 390 },
//!   { "op": "up" }
//! ]
//! ```

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use report_canvas::block::BlockId;
use report_canvas::camera::Point;
use report_canvas::editor::{Action, EditorCore, PointerTarget};
use report_canvas::handle::ResizeHandle;
use serde::Deserialize;

use crate::CliError;

/// A block reference: a UUID string or a flow-order index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BlockRef {
    Id(BlockId),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    Down {
        block: BlockRef,
        x: f64,
        y: f64,
        #[serde(default)]
        handle: Option<ResizeHandle>,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up,
    Cancel,
    Lock {
        block: BlockRef,
    },
    Unlock {
        block: BlockRef,
    },
    Front {
        block: BlockRef,
    },
    Back {
        block: BlockRef,
    },
    Forward {
        block: BlockRef,
    },
    Backward {
        block: BlockRef,
    },
    Rotate {
        block: BlockRef,
        degrees: f64,
    },
    Zoom {
        scale: f64,
    },
    Delete {
        block: BlockRef,
    },
}

/// Parse a script from JSON text.
///
/// # Errors
///
/// `CliError::Json` when the text is not a valid step array.
pub fn parse(text: &str) -> Result<Vec<Step>, CliError> {
    Ok(serde_json::from_str(text)?)
}

/// Run every step against `editor`, returning the actions emitted in order.
///
/// # Errors
///
/// Fails on the first step that names a missing block.
pub fn run(editor: &mut EditorCore, steps: &[Step]) -> Result<Vec<Action>, CliError> {
    let mut actions = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!(index, ?step, "replaying step");
        actions.extend(apply(editor, step)?);
    }
    Ok(actions)
}

fn apply(editor: &mut EditorCore, step: &Step) -> Result<Vec<Action>, CliError> {
    let actions = match *step {
        Step::Down { block, x, y, handle } => {
            let id = resolve(editor, block)?;
            let target = handle.map_or(PointerTarget::Body, PointerTarget::Handle);
            editor.on_pointer_down(id, target, Point::new(x, y))
        }
        Step::Move { x, y } => editor.on_pointer_move(Point::new(x, y)),
        Step::Up => editor.on_pointer_up(),
        Step::Cancel => editor.cancel(),
        Step::Lock { block } => {
            let id = resolve(editor, block)?;
            editor.set_locked(&id, true)?
        }
        Step::Unlock { block } => {
            let id = resolve(editor, block)?;
            editor.set_locked(&id, false)?
        }
        Step::Front { block } => {
            let id = resolve(editor, block)?;
            editor.bring_to_front(&id)?
        }
        Step::Back { block } => {
            let id = resolve(editor, block)?;
            editor.send_to_back(&id)?
        }
        Step::Forward { block } => {
            let id = resolve(editor, block)?;
            editor.bring_forward(&id)?
        }
        Step::Backward { block } => {
            let id = resolve(editor, block)?;
            editor.send_backward(&id)?
        }
        Step::Rotate { block, degrees } => {
            let id = resolve(editor, block)?;
            editor.set_rotation(&id, degrees)?
        }
        Step::Zoom { scale } => editor.set_scale(scale),
        Step::Delete { block } => {
            let id = resolve(editor, block)?;
            editor.delete(&id)
        }
    };
    Ok(actions)
}

fn resolve(editor: &EditorCore, block: BlockRef) -> Result<BlockId, CliError> {
    match block {
        BlockRef::Id(id) => Ok(id),
        BlockRef::Index(index) => editor
            .layout
            .blocks_by_order()
            .get(index)
            .map(|b| b.id)
            .ok_or(CliError::UnknownBlockIndex(index)),
    }
}
