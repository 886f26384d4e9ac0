use std::collections::VecDeque;
use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::error::{NoteError, Result};

/// How long to wait for input before checking toast expiry.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the notes directory cannot be listed, a note
    /// cannot be read or rendered, or the terminal cannot be driven. The
    /// terminal is restored before returning either way.
    pub fn run(&mut self) -> Result<()> {
        let mut model = self.initial_model()?;

        let mut terminal = ratatui::try_init().map_err(NoteError::Terminal)?;
        let mouse = self.config.mouse;
        let result = if mouse {
            execute!(stdout(), EnableMouseCapture)
                .map_err(NoteError::Terminal)
                .and_then(|()| self.event_loop(&mut terminal, &mut model))
        } else {
            self.event_loop(&mut terminal, &mut model)
        };

        if mouse {
            let _ = execute!(stdout(), DisableMouseCapture);
        }
        ratatui::restore();

        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        // Geometry is unknown until the first resize, so synthesize one.
        let size = terminal.size().map_err(NoteError::Terminal)?;
        let mut pending = Some(Message::Resize(size.width, size.height));
        let mut needs_render = true;

        loop {
            if let Some(msg) = pending.take() {
                self.dispatch(model, msg, || Self::reclaim_terminal(terminal))?;
                needs_render = true;
            }

            if model.should_quit {
                break;
            }

            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if needs_render {
                terminal
                    .draw(|frame| Self::view(model, frame))
                    .map_err(NoteError::Terminal)?;
                needs_render = false;
            }

            // Events are handled strictly in arrival order.
            if event::poll(POLL_INTERVAL).map_err(NoteError::Terminal)? {
                let event = event::read().map_err(NoteError::Terminal)?;
                pending = Self::handle_event(&event, model);
            }
        }

        Ok(())
    }

    /// Apply `msg` and every follow-up it produces.
    ///
    /// `reclaim` runs after each editor session and may report the current
    /// terminal size, which is then dispatched as a resize.
    pub(super) fn dispatch(
        &mut self,
        model: &mut Model,
        msg: Message,
        mut reclaim: impl FnMut() -> Result<Option<(u16, u16)>>,
    ) -> Result<()> {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            tracing::debug!(?msg, "dispatch");
            let launches_editor = msg.launches_editor();
            let side_msg = msg.clone();
            *model = update(std::mem::take(model), msg);
            let next = self.handle_message_side_effects(model, &side_msg)?;
            // The reclaimed size goes first so the re-list renders at it.
            if launches_editor && let Some((width, height)) = reclaim()? {
                queue.push_back(Message::Resize(width, height));
            }
            queue.extend(next);
        }
        Ok(())
    }

    /// Repaint from scratch after an editor session and report the size.
    ///
    /// Input typed while the editor owned the terminal is discarded.
    fn reclaim_terminal(terminal: &mut DefaultTerminal) -> Result<Option<(u16, u16)>> {
        terminal.clear().map_err(NoteError::Terminal)?;

        let mut dropped = 0_u32;
        while event::poll(Duration::ZERO).map_err(NoteError::Terminal)? {
            event::read().map_err(NoteError::Terminal)?;
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "discarded input queued during editor session");
        }

        let size = terminal.size().map_err(NoteError::Terminal)?;
        Ok(Some((size.width, size.height)))
    }
}
