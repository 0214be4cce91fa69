use std::io::{self, BufRead, BufReader, Stderr, Stdin, Write};
use std::sync::Mutex;

use thiserror::Error;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::search::candidates::SearchCandidate;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("io error while choosing a candidate: {0}")]
    Io(#[from] io::Error),

    #[error("no choice made (input closed)")]
    Cancelled,
}

/// Chooses one candidate from a ranked, non-empty list.
pub trait CandidateSelector: Send + Sync {
    /// Returns a zero-based index into `candidates`.
    fn choose(&self, candidates: &[SearchCandidate]) -> Result<usize, SelectionError>;
}

/// Always takes the best-ranked candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopRanked;

impl CandidateSelector for TopRanked {
    fn choose(&self, _candidates: &[SearchCandidate]) -> Result<usize, SelectionError> {
        Ok(0)
    }
}

/// Lists candidates on a writer and reads a 1-based choice back,
/// re-prompting until the answer is a valid number.
pub struct ConsoleSelector<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl ConsoleSelector<BufReader<Stdin>, Stderr> {
    /// Prompt on stderr so stdout stays reserved for the JSON result.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R, W> ConsoleSelector<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    /// Give back the writer, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<R, W> CandidateSelector for ConsoleSelector<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn choose(&self, candidates: &[SearchCandidate]) -> Result<usize, SelectionError> {
        // Reading a terminal blocks; on a multi-threaded runtime hand the
        // worker's other tasks off first.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.prompt(candidates))
            }
            _ => self.prompt(candidates),
        }
    }
}

impl<R, W> ConsoleSelector<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn prompt(&self, candidates: &[SearchCandidate]) -> Result<usize, SelectionError> {
        let mut input = self.input.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = self.output.lock().unwrap_or_else(|e| e.into_inner());

        writeln!(out, "\nFound {} possible games:", candidates.len())?;
        for (i, candidate) in candidates.iter().enumerate() {
            writeln!(
                out,
                "{}. {} (similarity: {:.2})",
                i + 1,
                candidate.name,
                candidate.similarity
            )?;
            writeln!(
                out,
                "   release date: {}",
                candidate.release_date.as_deref().unwrap_or("unknown")
            )?;
            writeln!(out, "   platforms: {}", candidate.platforms.join(", "))?;
            writeln!(out, "   url: {}\n", candidate.detail_ref)?;
        }

        loop {
            write!(out, "Enter the number of the game: ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(SelectionError::Cancelled);
            }

            match line.trim().parse::<usize>() {
                Ok(choice) if (1..=candidates.len()).contains(&choice) => return Ok(choice - 1),
                Ok(_) => writeln!(out, "Invalid choice, try again")?,
                Err(_) => writeln!(out, "Please enter a number")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::model::Platforms;
    use std::io::Cursor;

    fn candidates() -> Vec<SearchCandidate> {
        ["Titanfall 2", "Titanfall"]
            .iter()
            .enumerate()
            .map(|(i, name)| SearchCandidate {
                name: name.to_string(),
                detail_ref: format!("https://www.ign.com/games/{i}"),
                similarity: 1.0 - i as f64 * 0.2,
                release_date: (i == 0).then(|| "2016-10-28".to_string()),
                platforms: Platforms::from_iter(["PC", "Xbox One"]),
            })
            .collect()
    }

    #[test]
    fn top_ranked_picks_first() {
        assert_eq!(TopRanked.choose(&candidates()).unwrap(), 0);
    }

    #[test]
    fn console_reprompts_until_valid() {
        let selector = ConsoleSelector::new(Cursor::new("abc\n7\n2\n"), Vec::new());
        assert_eq!(selector.choose(&candidates()).unwrap(), 1);

        let printed = String::from_utf8(selector.into_output()).unwrap();
        assert!(printed.contains("1. Titanfall 2 (similarity: 1.00)"));
        assert!(printed.contains("2. Titanfall (similarity: 0.80)"));
        assert!(printed.contains("release date: unknown"));
        assert!(printed.contains("platforms: PC, Xbox One"));
        assert!(printed.contains("Please enter a number"));
        assert!(printed.contains("Invalid choice, try again"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn console_prompts_inside_multi_thread_runtime() {
        let selector = ConsoleSelector::new(Cursor::new("2\n"), Vec::new());
        assert_eq!(selector.choose(&candidates()).unwrap(), 1);
    }

    #[tokio::test]
    async fn console_prompts_inside_current_thread_runtime() {
        let selector = ConsoleSelector::new(Cursor::new("1\n"), Vec::new());
        assert_eq!(selector.choose(&candidates()).unwrap(), 0);
    }

    #[test]
    fn console_fails_on_closed_input() {
        let selector = ConsoleSelector::new(Cursor::new(""), Vec::new());
        assert!(matches!(
            selector.choose(&candidates()),
            Err(SelectionError::Cancelled)
        ));
    }
}
