//! Binary entrypoint that lists reconstructed Cursor chats.

use std::process::ExitCode;

use cursor_chat_reader::start_chat_reader;

/// Discover workspaces, rebuild their chats and log a summary per chat.
fn main() -> ExitCode {
    start_chat_reader::run()
}
