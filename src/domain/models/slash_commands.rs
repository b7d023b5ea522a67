#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    raw: String,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let raw = text.trim().to_string();
        let command = raw.split(' ').next().unwrap_or_default().to_string();

        let cmd = SlashCommand { command, raw };
        if cmd.is_quit()
            || cmd.is_attach()
            || cmd.is_detach()
            || cmd.is_cancel()
            || cmd.is_reset()
            || cmd.is_help()
        {
            return Some(cmd);
        }

        return None;
    }

    /// Everything after the command as typed, so file paths with spaces
    /// survive.
    pub fn arg_text(&self) -> String {
        return self.raw[self.command.len()..].trim().to_string();
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_attach(&self) -> bool {
        return ["/a", "/attach"].contains(&self.command.as_str());
    }

    pub fn is_detach(&self) -> bool {
        return ["/d", "/detach"].contains(&self.command.as_str());
    }

    pub fn is_cancel(&self) -> bool {
        return ["/c", "/cancel"].contains(&self.command.as_str());
    }

    pub fn is_reset(&self) -> bool {
        return ["/r", "/reset"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }
}
