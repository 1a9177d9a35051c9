use dialoguer::Completion;

pub struct CommandCompletion {
    options: Vec<String>,
}

impl Default for CommandCompletion {
    fn default() -> Self {
        CommandCompletion {
            options: [
                "/exit",
                "/clear",
                "/reset",
                "/copy",
                "/copy_all",
                "/paste",
                "/version",
                "/status",
                "/models",
                "/transcribe ",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Completion for CommandCompletion {
    /// Completes when exactly one command starts with the input.
    fn get(&self, input: &str) -> Option<String> {
        let matches = self
            .options
            .iter()
            .filter(|option| option.starts_with(input))
            .collect::<Vec<_>>();

        if matches.len() == 1 {
            Some(matches[0].to_string())
        } else {
            None
        }
    }
}
