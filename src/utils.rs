use bat::PrettyPrinter;

use crate::response::Renderer;

/// Highlights `content` as `language`, falling back to plain output when bat
/// does not know the language.
pub fn pretty_print(content: &str, language: &str) {
    let highlighted = PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language(language)
        .print();
    if let Err(e) = highlighted {
        log::debug!("cannot highlight as {}: {}", language, e);
        print!("{}", content);
    }
}

/// Prints a complete answer, highlighting its code blocks.
pub fn handle_output(content: &str, code_blocks: &mut Vec<String>) {
    let mut renderer = Renderer::new(code_blocks);
    renderer.feed(content);
    renderer.finish();
}
