/// Discrete input the game reacts to. Raw device state never reaches the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Confirm,
    Cancel,
    Flap,
    SelectUp,
    SelectDown,
    DevModeToggle,
    DevUp,
    DevDown,
}

/// Maps a `KeyboardEvent.code` to a command. Arrow keys move the menu selection on the
/// title screen and steer the bird in dev mode everywhere else.
pub fn command_for_key(code: &str, in_menu: bool) -> Option<Command> {
    if in_menu {
        return match code {
            "ArrowUp" => Some(Command::SelectUp),
            "ArrowDown" => Some(Command::SelectDown),
            "Space" | "Enter" => Some(Command::Confirm),
            _ => None,
        };
    }

    match code {
        "Escape" => Some(Command::Cancel),
        "Space" => Some(Command::Flap),
        "Enter" => Some(Command::Confirm),
        "KeyK" => Some(Command::DevModeToggle),
        "ArrowUp" => Some(Command::DevUp),
        "ArrowDown" => Some(Command::DevDown),
        _ => None,
    }
}

/// A tap or click anywhere on the canvas.
pub fn command_for_pointer(in_menu: bool) -> Command {
    if in_menu {
        Command::Confirm
    } else {
        Command::Flap
    }
}
