// Numeral automaton.
//
// A fixed table-driven DFA recognizing numeral literals: optional sign,
// digits with optional three-digit comma grouping, and at most one decimal
// point. Pure lookup, no allocation.

/// Input character classes of the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    Digit = 0,
    Plus = 1,
    Minus = 2,
    Dot = 3,
    Comma = 4,
    Other = 5,
}

/// Automaton state; an opaque index into the transition table.
pub type State = u8;

/// The initial state.
pub const START: State = 0;

const SIGN: State = 1;
const INT1: State = 2;
const INT2: State = 3;
const INT3: State = 4;
const INT: State = 5;
const GRP1: State = 6;
const GRP2: State = 7;
const GRP3: State = 8;
const GRP: State = 9;
const DOT: State = 10;
const FRAC: State = 11;
const DEAD: State = 12;

const STATE_COUNT: usize = 13;

/// Transition table, `TRANSITIONS[state][class]`.
///
/// Comma grouping is strict: a comma may follow at most three leading
/// digits or a complete three-digit group, and every comma must be
/// followed by exactly three digits. A decimal point must be followed by
/// at least one digit; ".5" / "-.5" are accepted, "3." is not.
#[rustfmt::skip]
const TRANSITIONS: [[State; 6]; STATE_COUNT] = [
    //            Digit  Plus  Minus  Dot   Comma  Other
    /* START */ [ INT1,  SIGN, SIGN,  DOT,  DEAD,  DEAD ],
    /* SIGN  */ [ INT1,  DEAD, DEAD,  DOT,  DEAD,  DEAD ],
    /* INT1  */ [ INT2,  DEAD, DEAD,  DOT,  GRP1,  DEAD ],
    /* INT2  */ [ INT3,  DEAD, DEAD,  DOT,  GRP1,  DEAD ],
    /* INT3  */ [ INT,   DEAD, DEAD,  DOT,  GRP1,  DEAD ],
    /* INT   */ [ INT,   DEAD, DEAD,  DOT,  DEAD,  DEAD ],
    /* GRP1  */ [ GRP2,  DEAD, DEAD,  DEAD, DEAD,  DEAD ],
    /* GRP2  */ [ GRP3,  DEAD, DEAD,  DEAD, DEAD,  DEAD ],
    /* GRP3  */ [ GRP,   DEAD, DEAD,  DEAD, DEAD,  DEAD ],
    /* GRP   */ [ DEAD,  DEAD, DEAD,  DOT,  GRP1,  DEAD ],
    /* DOT   */ [ FRAC,  DEAD, DEAD,  DEAD, DEAD,  DEAD ],
    /* FRAC  */ [ FRAC,  DEAD, DEAD,  DEAD, DEAD,  DEAD ],
    /* DEAD  */ [ DEAD,  DEAD, DEAD,  DEAD, DEAD,  DEAD ],
];

const ACCEPTING: [bool; STATE_COUNT] = [
    false, false, true, true, true, true, false, false, false, true, false, true, false,
];

/// Classify one input character.
pub fn classify(c: char) -> InputClass {
    match c {
        '0'..='9' => InputClass::Digit,
        '+' => InputClass::Plus,
        '-' => InputClass::Minus,
        '.' => InputClass::Dot,
        ',' => InputClass::Comma,
        _ => InputClass::Other,
    }
}

/// Advance the automaton by one input class.
pub fn advance(state: State, class: InputClass) -> State {
    TRANSITIONS[state as usize][class as usize]
}

/// Whether `state` accepts.
pub fn is_accepting(state: State) -> bool {
    ACCEPTING[state as usize]
}

/// Run the automaton over a whole string.
pub fn recognize(text: &str) -> bool {
    let mut state = START;
    for c in text.chars() {
        state = advance(state, classify(c));
        if state == DEAD {
            return false;
        }
    }
    is_accepting(state)
}
