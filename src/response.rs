use std::io::Write;

use edgen_client::Result;
use futures_util::{Stream, StreamExt};
use indicatif::ProgressBar;

use crate::utils::pretty_print;

/// Prints streamed increments as they arrive and returns the whole answer.
/// The spinner is cleared once the first increment shows up.
pub async fn process_response<S>(
    mut stream: S,
    code_blocks: &mut Vec<String>,
    spinner: Option<ProgressBar>,
) -> Result<String>
where
    S: Stream<Item = Result<String>> + Unpin,
{
    let mut spinner = spinner;
    let mut full_response = String::new();
    let mut renderer = Renderer::new(code_blocks);

    while let Some(delta) = stream.next().await {
        if let Some(spinner) = spinner.take() {
            spinner.finish_and_clear();
        }
        let delta = match delta {
            Ok(delta) => delta,
            Err(e) => {
                renderer.finish();
                return Err(e);
            }
        };
        full_response.push_str(&delta);
        renderer.feed(&delta);
    }
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    renderer.finish();
    Ok(full_response)
}

/// Line-oriented printer: prose goes straight to stdout, fenced code blocks
/// are held back until the closing fence and then highlighted.
pub struct Renderer<'a> {
    code_blocks: &'a mut Vec<String>,
    line: String,
    printed: usize,
    code: Option<(String, String)>,
}

impl<'a> Renderer<'a> {
    pub fn new(code_blocks: &'a mut Vec<String>) -> Self {
        Renderer {
            code_blocks,
            line: String::new(),
            printed: 0,
            code: None,
        }
    }

    pub fn feed(&mut self, content: &str) {
        for ch in content.chars() {
            self.line.push(ch);
            if ch == '\n' {
                self.end_line();
            }
        }

        // a line starting with a backtick may still turn into a fence
        if self.code.is_none() && !self.line.trim_start().starts_with('`') {
            print!("{}", &self.line[self.printed..]);
            self.printed = self.line.len();
            let _ = std::io::stdout().flush();
        }
    }

    pub fn finish(&mut self) {
        if !self.line.is_empty() {
            self.line.push('\n');
            self.end_line();
        }
        if let Some((language, code)) = self.code.take() {
            self.emit_code(&language, code);
        }
        println!();
    }

    fn end_line(&mut self) {
        let line = std::mem::take(&mut self.line);
        let printed = std::mem::replace(&mut self.printed, 0);

        if let Some(info) = line.trim_start().strip_prefix("```") {
            match self.code.take() {
                Some((language, code)) => self.emit_code(&language, code),
                None => {
                    let language = match info.trim() {
                        "" => "txt".to_string(),
                        language => language.to_string(),
                    };
                    self.code = Some((language, String::new()));
                }
            }
        } else if let Some((_, code)) = self.code.as_mut() {
            code.push_str(&line);
        } else {
            print!("{}", &line[printed..]);
        }
    }

    fn emit_code(&mut self, language: &str, code: String) {
        if code.is_empty() {
            return;
        }
        pretty_print(&code, language);
        self.code_blocks.push(code);
    }
}
