use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use buddy_core::display::{CharacterGrid, VISIBLE_COLUMNS};
use buddy_core::feedback::{BUZZ_PATTERN, Note};
use buddy_core::hal::{
    AnalogLine, CharacterDisplay, CursorShift, Indicators, Led, Motor, Speaker, TickSource,
};
use buddy_core::input::{ButtonLadder, LogicalInput};
use buddy_core::tick::TickLatch;
use crossterm::cursor::{Hide, MoveTo};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

/// Ladder samples a single key press holds the line above the noise floor.
const PRESS_SAMPLES: usize = 2;

/// How long one keypad poll may block waiting for a key.
const KEY_POLL_TIMEOUT: Duration = Duration::from_millis(5);

/// How long a key press holds the ladder line.
///
/// A press nobody samples within this window is lost, as it would be on the
/// board while the session is counting down.
const PRESS_HOLD: Duration = Duration::from_millis(150);

/// Granularity of the tick latch's idle sleep.
const TICK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Everything the terminal frame shows, shared by the peripheral handles.
pub struct Screen {
    grid: CharacterGrid,
    study_led: bool,
    break_led: bool,
    note: Option<Note>,
    motor: bool,
    last_event: String,
    error: Option<io::Error>,
}

pub type SharedScreen = Rc<RefCell<Screen>>;

impl Screen {
    pub fn shared() -> SharedScreen {
        Rc::new(RefCell::new(Self {
            grid: CharacterGrid::new(),
            study_led: false,
            break_led: false,
            note: None,
            motor: false,
            last_event: String::new(),
            error: None,
        }))
    }

    pub fn set_last_event(&mut self, event: String) {
        self.last_event = event;
        self.redraw();
    }

    /// Returns the first terminal write failure, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn redraw(&mut self) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.draw(&mut io::stdout().lock()) {
            self.error = Some(err);
        }
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        let border = "-".repeat(VISIBLE_COLUMNS + 2);
        queue!(out, Hide, MoveTo(0, 0))?;
        queue!(out, Print(format!("+{border}+")))?;
        for row in 0..2u16 {
            let cells = self.grid.visible_row(usize::from(row));
            queue!(out, MoveTo(0, row + 1), Print(format!("| {cells} |")))?;
        }
        queue!(out, MoveTo(0, 3), Print(format!("+{border}+")))?;

        let (cursor_row, cursor_column) = self.grid.cursor_position();
        let marker = if cursor_column < VISIBLE_COLUMNS {
            format!("cursor r{cursor_row} c{cursor_column}")
        } else {
            format!("cursor r{cursor_row} off-glass")
        };
        queue!(
            out,
            MoveTo(0, 5),
            Print(format!(
                "LED study [{}]  LED break [{}]  speaker {}  motor {}",
                lamp(self.study_led),
                lamp(self.break_led),
                self.note.map_or_else(|| "-".to_string(), |note| note.name().to_string()),
                if self.motor { "on" } else { "off" },
            )),
            Clear(ClearType::UntilNewLine),
            MoveTo(0, 6),
            Print(marker),
            Clear(ClearType::UntilNewLine),
            MoveTo(0, 7),
            Print(format!("last: {}", self.last_event)),
            Clear(ClearType::UntilNewLine),
            MoveTo(0, 9),
            Print("arrows: navigate  enter/space: select  q/esc: quit"),
        )?;
        out.flush()
    }
}

fn lamp(lit: bool) -> char {
    if lit { '*' } else { ' ' }
}

/// Wall-clock tick latch, optionally running faster than real time.
pub struct HostTick {
    period: Duration,
    next: Instant,
    latch: TickLatch,
}

impl HostTick {
    pub fn new(speed: u32) -> Self {
        let period = Duration::from_secs(1) / speed.max(1);
        Self {
            period,
            next: Instant::now() + period,
            latch: TickLatch::new(),
        }
    }

    /// Sets the latch if a period boundary has passed by `now`.
    ///
    /// Missed periods collapse into one pending tick.
    fn advance_to(&mut self, now: Instant) {
        if now >= self.next {
            self.next = now + self.period;
            self.latch.set();
        }
    }
}

impl TickSource for HostTick {
    fn second_elapsed(&mut self) -> bool {
        let now = Instant::now();
        self.advance_to(now);
        if self.latch.second_elapsed() {
            return true;
        }
        thread::sleep(TICK_POLL_INTERVAL.min(self.next.saturating_duration_since(now)));
        false
    }
}

/// Maps a key to the button it stands in for.
pub fn key_to_input(code: KeyCode) -> Option<LogicalInput> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(LogicalInput::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(LogicalInput::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(LogicalInput::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(LogicalInput::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Some(LogicalInput::Select),
        _ => None,
    }
}

fn is_quit(code: KeyCode) -> bool {
    matches!(code, KeyCode::Esc | KeyCode::Char('q'))
}

/// Terminal key events sorted into button presses and a quit request.
#[derive(Default)]
pub struct Keyboard {
    presses: VecDeque<(LogicalInput, Instant)>,
    quit: bool,
}

pub type SharedKeyboard = Rc<RefCell<Keyboard>>;

impl Keyboard {
    pub fn shared() -> SharedKeyboard {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Drains every key event available within `timeout`.
    pub fn pump(&mut self, timeout: Duration) {
        // Read failures count as no key.
        while let Ok(true) = event::poll(timeout) {
            match event::read() {
                Ok(Event::Key(key)) => self.handle_key(key),
                Ok(_) => {}
                Err(_) => break,
            }
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Returns the oldest press still held at `now`, discarding expired ones.
    pub fn take_press(&mut self, now: Instant) -> Option<LogicalInput> {
        while let Some((input, pressed_at)) = self.presses.pop_front() {
            if now.saturating_duration_since(pressed_at) <= PRESS_HOLD {
                return Some(input);
            }
        }
        None
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.handle_key_at(key, Instant::now());
    }

    fn handle_key_at(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if is_quit(key.code) {
            self.quit = true;
        } else if let Some(input) = key_to_input(key.code) {
            self.presses.push_back((input, now));
        }
    }
}

/// Keyboard standing in for the resistor ladder.
///
/// Each key press is replayed as a few samples at the middle of the button's
/// band followed by a released sample, so the core sees a normal
/// press/release cycle.
pub struct Keypad {
    ladder: ButtonLadder,
    keyboard: SharedKeyboard,
    pending: VecDeque<u16>,
}

impl Keypad {
    pub fn new(ladder: ButtonLadder, keyboard: SharedKeyboard) -> Self {
        Self {
            ladder,
            keyboard,
            pending: VecDeque::new(),
        }
    }

    /// Queues the samples of one press/release cycle for `input`.
    pub fn press(&mut self, input: LogicalInput) {
        if let Some(band) = self.ladder.band_for(input) {
            let level = band.midpoint();
            self.pending.extend([level; PRESS_SAMPLES]);
            self.pending.push_back(0);
        }
    }

    fn next_key_press(&mut self) -> Option<LogicalInput> {
        let mut keyboard = self.keyboard.borrow_mut();
        if keyboard.presses.is_empty() {
            keyboard.pump(KEY_POLL_TIMEOUT);
        }
        keyboard.take_press(Instant::now())
    }
}

impl AnalogLine for Keypad {
    fn sample(&mut self) -> u16 {
        if self.pending.is_empty() {
            if let Some(input) = self.next_key_press() {
                self.press(input);
            }
        }
        self.pending.pop_front().unwrap_or(0)
    }
}

/// 16x2 display drawn into the terminal.
pub struct TerminalDisplay {
    screen: SharedScreen,
}

impl TerminalDisplay {
    pub fn new(screen: SharedScreen) -> Self {
        Self { screen }
    }

    fn update(&mut self, apply: impl FnOnce(&mut CharacterGrid)) {
        let mut screen = self.screen.borrow_mut();
        apply(&mut screen.grid);
        screen.redraw();
    }
}

impl CharacterDisplay for TerminalDisplay {
    fn clear(&mut self) {
        self.update(CharacterGrid::clear);
    }

    fn reset_cursor(&mut self) {
        self.update(CharacterGrid::reset_cursor);
    }

    fn advance_row(&mut self) {
        self.update(CharacterGrid::advance_row);
    }

    fn print_char(&mut self, c: char) {
        self.update(|grid| grid.print_char(c));
    }

    fn move_cursor(&mut self, direction: CursorShift, count: u8) {
        self.update(|grid| grid.move_cursor(direction, count));
    }

    fn print_str(&mut self, text: &str) {
        self.update(|grid| grid.print_str(text));
    }
}

/// Shows the playing note on the status line for as long as it sounds.
pub struct StatusSpeaker {
    screen: SharedScreen,
    speed: u32,
}

impl StatusSpeaker {
    pub fn new(screen: SharedScreen, speed: u32) -> Self {
        Self {
            screen,
            speed: speed.max(1),
        }
    }

    fn show(&self, note: Option<Note>) {
        let mut screen = self.screen.borrow_mut();
        screen.note = note;
        screen.redraw();
    }
}

impl Speaker for StatusSpeaker {
    async fn play_tone(&mut self, note: Note, duration: Duration) {
        self.show(Some(note));
        thread::sleep(duration / self.speed);
        self.show(None);
    }
}

/// Shows the motor state on the status line while walking the buzz pattern.
pub struct StatusMotor {
    screen: SharedScreen,
    speed: u32,
}

impl StatusMotor {
    pub fn new(screen: SharedScreen, speed: u32) -> Self {
        Self {
            screen,
            speed: speed.max(1),
        }
    }
}

impl Motor for StatusMotor {
    async fn buzz(&mut self) {
        for segment in BUZZ_PATTERN {
            {
                let mut screen = self.screen.borrow_mut();
                screen.motor = segment.running;
                screen.redraw();
            }
            thread::sleep(segment.duration / self.speed);
        }
        let mut screen = self.screen.borrow_mut();
        screen.motor = false;
        screen.redraw();
    }
}

/// LED pair drawn on the status line.
pub struct StatusLeds {
    screen: SharedScreen,
}

impl StatusLeds {
    pub fn new(screen: SharedScreen) -> Self {
        Self { screen }
    }
}

impl Indicators for StatusLeds {
    fn set(&mut self, led: Led, lit: bool) {
        let mut screen = self.screen.borrow_mut();
        match led {
            Led::Study => screen.study_led = lit,
            Led::Break => screen.break_led = lit,
        }
        screen.redraw();
    }
}
