//! Operator buttons and press-edge detection

/// One operator button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Start or cancel recording
    Record,
    /// Close the current segment by hand
    Mark,
    /// Play the recording first to last
    PlayForward,
    /// Play the recording last to first
    PlayReverse,
    /// Abort playback (read as a level)
    Abort,
    /// Two-step delete of the stored recording
    Delete,
    /// Save the recording to flash
    Save,
    /// Load the recording from flash
    Load,
}

impl Button {
    /// All buttons, in a fixed order
    pub const ALL: [Button; 8] = [
        Button::Record,
        Button::Mark,
        Button::PlayForward,
        Button::PlayReverse,
        Button::Abort,
        Button::Delete,
        Button::Save,
        Button::Load,
    ];
}

/// State of every button in one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons {
    pub record: bool,
    pub mark: bool,
    pub play_forward: bool,
    pub play_reverse: bool,
    pub abort: bool,
    pub delete: bool,
    pub save: bool,
    pub load: bool,
}

impl Buttons {
    /// Nothing pressed
    pub const NONE: Buttons = Buttons {
        record: false,
        mark: false,
        play_forward: false,
        play_reverse: false,
        abort: false,
        delete: false,
        save: false,
        load: false,
    };

    /// Only `button` pressed
    pub fn only(button: Button) -> Self {
        let mut buttons = Self::NONE;
        buttons.set(button, true);
        buttons
    }

    /// Build from a per-button predicate
    pub fn from_fn(mut f: impl FnMut(Button) -> bool) -> Self {
        let mut buttons = Self::NONE;
        for button in Button::ALL {
            buttons.set(button, f(button));
        }
        buttons
    }

    /// State of one button
    pub fn get(&self, button: Button) -> bool {
        match button {
            Button::Record => self.record,
            Button::Mark => self.mark,
            Button::PlayForward => self.play_forward,
            Button::PlayReverse => self.play_reverse,
            Button::Abort => self.abort,
            Button::Delete => self.delete,
            Button::Save => self.save,
            Button::Load => self.load,
        }
    }

    /// Set one button
    pub fn set(&mut self, button: Button, pressed: bool) {
        let slot = match button {
            Button::Record => &mut self.record,
            Button::Mark => &mut self.mark,
            Button::PlayForward => &mut self.play_forward,
            Button::PlayReverse => &mut self.play_reverse,
            Button::Abort => &mut self.abort,
            Button::Delete => &mut self.delete,
            Button::Save => &mut self.save,
            Button::Load => &mut self.load,
        };
        *slot = pressed;
    }
}

/// Rising-edge detector over successive button samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEdges {
    previous: Buttons,
}

impl ButtonEdges {
    pub const fn new() -> Self {
        Self {
            previous: Buttons::NONE,
        }
    }

    /// Feed a new sample and return the buttons that went from released to
    /// pressed since the previous one
    pub fn update(&mut self, current: Buttons) -> Buttons {
        let previous = self.previous;
        self.previous = current;
        Buttons::from_fn(|b| current.get(b) && !previous.get(b))
    }

    /// Treat every currently held button as already seen
    ///
    /// Called after playback so a button still held from before does not
    /// fire again.
    pub fn resync(&mut self, current: Buttons) {
        self.previous = current;
    }
}
