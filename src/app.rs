use anyhow::Result;
use colored::*;
use musa_core::{AssistantBackend, ChatSession};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::handler;
use crate::ui;

pub struct App<B: AssistantBackend> {
    pub should_quit: bool,
    pub session: ChatSession<B>,
    // Turns already printed to the terminal
    rendered: usize,
}

impl<B: AssistantBackend> App<B> {
    pub fn new(session: ChatSession<B>) -> Self {
        Self {
            should_quit: false,
            session,
            rendered: 0,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", "AI Farming Assistant".bold().green());
        println!("{}", "Type /help for commands".dimmed());

        self.session.connect().await;
        ui::print_header(self.session.language().as_str(), self.session.status());
        self.render_new_turns();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while !self.should_quit {
            print!("{} ", ">".bold());
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            handler::handle_input(self, &line).await?;
            self.render_new_turns();
        }

        Ok(())
    }

    /// Print turns added since the last call
    pub fn render_new_turns(&mut self) {
        let turns = self.session.turns();
        for turn in &turns[self.rendered.min(turns.len())..] {
            ui::print_turn(turn);
        }
        self.rendered = turns.len();
    }
}
