use crate::types::{PipelineState, Result, DEFAULT_TOPIC};
use std::io::{self, BufRead, Write};
use tracing::info;

/// Trait for soliciting a line of input from whoever is driving the run
pub trait SelectionPrompt: Send {
    /// Show the prompt and return one line of input
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Console-backed prompt reading from stdin
pub struct ConsolePrompt;

impl SelectionPrompt for ConsolePrompt {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Scripted prompt for tests; panics in `ask` if the script runs dry
pub struct ScriptedPrompt {
    answers: Vec<String>,
    asked: usize,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<&str>) -> Self {
        Self {
            answers: answers.into_iter().map(str::to_string).collect(),
            asked: 0,
        }
    }

    /// Number of times the prompt was shown
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl SelectionPrompt for ScriptedPrompt {
    fn ask(&mut self, _prompt: &str) -> Result<String> {
        let answer = self
            .answers
            .get(self.asked)
            .cloned()
            .expect("scripted prompt exhausted");
        self.asked += 1;
        Ok(answer)
    }
}

/// Pick exactly one topic from the candidates in the state.
///
/// Empty candidates select the default topic with no interaction. A
/// blank answer selects the first candidate; anything non-numeric or
/// out of range is rejected and re-solicited until a valid choice
/// arrives.
pub fn select_topic(state: &mut PipelineState, prompt: &mut dyn SelectionPrompt) -> Result<()> {
    if state.candidate_topics.is_empty() {
        info!("No candidate topics found, using default: {}", DEFAULT_TOPIC);
        state.selected_topic = DEFAULT_TOPIC.to_string();
        return Ok(());
    }

    println!("\nTrending AI Topics:");
    for (i, topic) in state.candidate_topics.iter().enumerate() {
        println!("{}. {}", i + 1, topic);
    }

    let count = state.candidate_topics.len();
    let index = loop {
        let answer = prompt.ask(&format!("\nSelect a topic number (1-{count}): "))?;
        let answer = answer.trim();

        if answer.is_empty() {
            break 0;
        }

        match answer.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => break n - 1,
            Ok(_) => println!("Please enter a number between 1 and {count}"),
            Err(_) => println!("Please enter a valid number"),
        }
    };

    state.selected_topic = state.candidate_topics[index].clone();
    info!("Selected topic: {}", state.selected_topic);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(topics: &[&str]) -> PipelineState {
        let mut state = PipelineState::with_run_id("test".to_string());
        state.candidate_topics = topics.iter().map(|s| s.to_string()).collect();
        state
    }

    #[test]
    fn empty_candidates_select_default_without_asking() {
        let mut state = state_with(&[]);
        let mut prompt = ScriptedPrompt::new(vec![]);
        select_topic(&mut state, &mut prompt).unwrap();
        assert_eq!(state.selected_topic, DEFAULT_TOPIC);
        assert_eq!(prompt.asked(), 0);
    }

    #[test]
    fn numeric_choice_is_one_based() {
        let mut state = state_with(&["Topic A", "Topic B"]);
        let mut prompt = ScriptedPrompt::new(vec!["2"]);
        select_topic(&mut state, &mut prompt).unwrap();
        assert_eq!(state.selected_topic, "Topic B");
    }

    #[test]
    fn blank_answer_selects_first_candidate() {
        let mut state = state_with(&["Topic A", "Topic B"]);
        let mut prompt = ScriptedPrompt::new(vec!["\n"]);
        select_topic(&mut state, &mut prompt).unwrap();
        assert_eq!(state.selected_topic, "Topic A");
    }

    #[test]
    fn invalid_answers_are_resolicited() {
        let mut state = state_with(&["Topic A", "Topic B"]);
        let mut prompt = ScriptedPrompt::new(vec!["abc", "7", "0", "1"]);
        select_topic(&mut state, &mut prompt).unwrap();
        assert_eq!(state.selected_topic, "Topic A");
        assert_eq!(prompt.asked(), 4);
    }
}
