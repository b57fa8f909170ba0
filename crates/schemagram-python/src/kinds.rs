// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Token and rule kinds of the Python3Subset grammar.

use schemagram_tree::{grammar_dispatch, Node, TokenKind};

/// Token kinds produced by the Python3Subset lexer.
///
/// Whitespace, comments, blank lines and line breaks inside brackets are
/// skipped by the lexer and have no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PyToken {
    Indent,
    Dedent,
    Newline,
    Name,
    Number,
    /// String and bytes literals, with any prefix.
    String,

    // Template strings: `f'...'`, `f"..."`, `f'''...'''`, `f"""..."""`.
    SingleQuoteShortTemplateStart,
    DoubleQuoteShortTemplateStart,
    SingleQuoteLongTemplateStart,
    DoubleQuoteLongTemplateStart,
    SingleQuoteShortTemplateEnd,
    SingleQuoteLongTemplateEnd,
    DoubleQuoteShortTemplateEnd,
    DoubleQuoteLongTemplateEnd,
    /// Literal text between the holes of a single-quoted template.
    SingleQuoteStringAtom,
    /// Literal text between the holes of a double-quoted template.
    DoubleQuoteStringAtom,
    /// The `}` closing a template hole.
    TemplateCloseBrace,

    // Keywords
    Def,
    Return,
    Raise,
    From,
    Import,
    As,
    Global,
    Nonlocal,
    Assert,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Try,
    Finally,
    With,
    Except,
    Lambda,
    Or,
    And,
    Not,
    Is,
    None,
    True,
    False,
    Class,
    Yield,
    Del,
    Pass,
    Continue,
    Break,
    Async,
    Await,

    // Operators and delimiters
    Dot,
    Ellipsis,
    Star,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    SemiColon,
    Power,
    Assign,
    OpenBrack,
    CloseBrack,
    OrOp,
    Xor,
    AndOp,
    LeftShift,
    RightShift,
    Add,
    Minus,
    Div,
    Mod,
    Idiv,
    NotOp,
    OpenBrace,
    CloseBrace,
    LessThan,
    GreaterThan,
    Equals,
    GtEq,
    LtEq,
    /// `<>`
    NotEq1,
    /// `!=`
    NotEq2,
    At,
    Arrow,
    AddAssign,
    SubAssign,
    MultAssign,
    AtAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LeftShiftAssign,
    RightShiftAssign,
    PowerAssign,
    IdivAssign,
    Eof,
}

impl PyToken {
    /// The keyword spelled by `word`. Keywords are case-sensitive.
    pub fn keyword(word: &str) -> Option<PyToken> {
        let kind = match word {
            "def" => PyToken::Def,
            "return" => PyToken::Return,
            "raise" => PyToken::Raise,
            "from" => PyToken::From,
            "import" => PyToken::Import,
            "as" => PyToken::As,
            "global" => PyToken::Global,
            "nonlocal" => PyToken::Nonlocal,
            "assert" => PyToken::Assert,
            "if" => PyToken::If,
            "elif" => PyToken::Elif,
            "else" => PyToken::Else,
            "while" => PyToken::While,
            "for" => PyToken::For,
            "in" => PyToken::In,
            "try" => PyToken::Try,
            "finally" => PyToken::Finally,
            "with" => PyToken::With,
            "except" => PyToken::Except,
            "lambda" => PyToken::Lambda,
            "or" => PyToken::Or,
            "and" => PyToken::And,
            "not" => PyToken::Not,
            "is" => PyToken::Is,
            "None" => PyToken::None,
            "True" => PyToken::True,
            "False" => PyToken::False,
            "class" => PyToken::Class,
            "yield" => PyToken::Yield,
            "del" => PyToken::Del,
            "pass" => PyToken::Pass,
            "continue" => PyToken::Continue,
            "break" => PyToken::Break,
            "async" => PyToken::Async,
            "await" => PyToken::Await,
            _ => return None,
        };
        Some(kind)
    }

    /// Operators and delimiters, longest spelling first.
    pub const OPERATORS: &'static [(&'static str, PyToken)] = &[
        ("...", PyToken::Ellipsis),
        ("**=", PyToken::PowerAssign),
        ("//=", PyToken::IdivAssign),
        ("<<=", PyToken::LeftShiftAssign),
        (">>=", PyToken::RightShiftAssign),
        ("**", PyToken::Power),
        ("//", PyToken::Idiv),
        ("<<", PyToken::LeftShift),
        (">>", PyToken::RightShift),
        ("<=", PyToken::LtEq),
        (">=", PyToken::GtEq),
        ("==", PyToken::Equals),
        ("!=", PyToken::NotEq2),
        ("<>", PyToken::NotEq1),
        ("->", PyToken::Arrow),
        ("+=", PyToken::AddAssign),
        ("-=", PyToken::SubAssign),
        ("*=", PyToken::MultAssign),
        ("@=", PyToken::AtAssign),
        ("/=", PyToken::DivAssign),
        ("%=", PyToken::ModAssign),
        ("&=", PyToken::AndAssign),
        ("|=", PyToken::OrAssign),
        ("^=", PyToken::XorAssign),
        (".", PyToken::Dot),
        ("*", PyToken::Star),
        ("(", PyToken::OpenParen),
        (")", PyToken::CloseParen),
        (",", PyToken::Comma),
        (":", PyToken::Colon),
        (";", PyToken::SemiColon),
        ("=", PyToken::Assign),
        ("[", PyToken::OpenBrack),
        ("]", PyToken::CloseBrack),
        ("|", PyToken::OrOp),
        ("^", PyToken::Xor),
        ("&", PyToken::AndOp),
        ("+", PyToken::Add),
        ("-", PyToken::Minus),
        ("/", PyToken::Div),
        ("%", PyToken::Mod),
        ("~", PyToken::NotOp),
        ("{", PyToken::OpenBrace),
        ("}", PyToken::CloseBrace),
        ("<", PyToken::LessThan),
        (">", PyToken::GreaterThan),
        ("@", PyToken::At),
    ];

    /// Whether this token ends or opens a layout block (`NEWLINE`,
    /// `INDENT`, `DEDENT`).
    pub fn is_layout(self) -> bool {
        matches!(self, PyToken::Newline | PyToken::Indent | PyToken::Dedent)
    }
}

impl TokenKind for PyToken {
    fn name(self) -> &'static str {
        match self {
            PyToken::Indent => "INDENT",
            PyToken::Dedent => "DEDENT",
            PyToken::Newline => "NEWLINE",
            PyToken::Name => "NAME",
            PyToken::Number => "NUMBER",
            PyToken::String => "STRING",
            PyToken::SingleQuoteShortTemplateStart => "SINGLE_QUOTE_SHORT_TEMPLATE_STRING_START",
            PyToken::DoubleQuoteShortTemplateStart => "DOUBLE_QUOTE_SHORT_TEMPLATE_STRING_START",
            PyToken::SingleQuoteLongTemplateStart => "SINGLE_QUOTE_LONG_TEMPLATE_STRING_START",
            PyToken::DoubleQuoteLongTemplateStart => "DOUBLE_QUOTE_LONG_TEMPLATE_STRING_START",
            PyToken::SingleQuoteShortTemplateEnd => "SINGLE_QUOTE_SHORT_TEMPLATE_STRING_END",
            PyToken::SingleQuoteLongTemplateEnd => "SINGLE_QUOTE_LONG_TEMPLATE_STRING_END",
            PyToken::DoubleQuoteShortTemplateEnd => "DOUBLE_QUOTE_SHORT_TEMPLATE_STRING_END",
            PyToken::DoubleQuoteLongTemplateEnd => "DOUBLE_QUOTE_LONG_TEMPLATE_STRING_END",
            PyToken::SingleQuoteStringAtom => "SINGLE_QUOTE_STRING_ATOM",
            PyToken::DoubleQuoteStringAtom => "DOUBLE_QUOTE_STRING_ATOM",
            PyToken::TemplateCloseBrace => "TEMPLATE_CLOSE_BRACE",
            PyToken::Def => "'def'",
            PyToken::Return => "'return'",
            PyToken::Raise => "'raise'",
            PyToken::From => "'from'",
            PyToken::Import => "'import'",
            PyToken::As => "'as'",
            PyToken::Global => "'global'",
            PyToken::Nonlocal => "'nonlocal'",
            PyToken::Assert => "'assert'",
            PyToken::If => "'if'",
            PyToken::Elif => "'elif'",
            PyToken::Else => "'else'",
            PyToken::While => "'while'",
            PyToken::For => "'for'",
            PyToken::In => "'in'",
            PyToken::Try => "'try'",
            PyToken::Finally => "'finally'",
            PyToken::With => "'with'",
            PyToken::Except => "'except'",
            PyToken::Lambda => "'lambda'",
            PyToken::Or => "'or'",
            PyToken::And => "'and'",
            PyToken::Not => "'not'",
            PyToken::Is => "'is'",
            PyToken::None => "'None'",
            PyToken::True => "'True'",
            PyToken::False => "'False'",
            PyToken::Class => "'class'",
            PyToken::Yield => "'yield'",
            PyToken::Del => "'del'",
            PyToken::Pass => "'pass'",
            PyToken::Continue => "'continue'",
            PyToken::Break => "'break'",
            PyToken::Async => "'async'",
            PyToken::Await => "'await'",
            PyToken::Dot => "'.'",
            PyToken::Ellipsis => "'...'",
            PyToken::Star => "'*'",
            PyToken::OpenParen => "'('",
            PyToken::CloseParen => "')'",
            PyToken::Comma => "','",
            PyToken::Colon => "':'",
            PyToken::SemiColon => "';'",
            PyToken::Power => "'**'",
            PyToken::Assign => "'='",
            PyToken::OpenBrack => "'['",
            PyToken::CloseBrack => "']'",
            PyToken::OrOp => "'|'",
            PyToken::Xor => "'^'",
            PyToken::AndOp => "'&'",
            PyToken::LeftShift => "'<<'",
            PyToken::RightShift => "'>>'",
            PyToken::Add => "'+'",
            PyToken::Minus => "'-'",
            PyToken::Div => "'/'",
            PyToken::Mod => "'%'",
            PyToken::Idiv => "'//'",
            PyToken::NotOp => "'~'",
            PyToken::OpenBrace => "'{'",
            PyToken::CloseBrace => "'}'",
            PyToken::LessThan => "'<'",
            PyToken::GreaterThan => "'>'",
            PyToken::Equals => "'=='",
            PyToken::GtEq => "'>='",
            PyToken::LtEq => "'<='",
            PyToken::NotEq1 => "'<>'",
            PyToken::NotEq2 => "'!='",
            PyToken::At => "'@'",
            PyToken::Arrow => "'->'",
            PyToken::AddAssign => "'+='",
            PyToken::SubAssign => "'-='",
            PyToken::MultAssign => "'*='",
            PyToken::AtAssign => "'@='",
            PyToken::DivAssign => "'/='",
            PyToken::ModAssign => "'%='",
            PyToken::AndAssign => "'&='",
            PyToken::OrAssign => "'|='",
            PyToken::XorAssign => "'^='",
            PyToken::LeftShiftAssign => "'<<='",
            PyToken::RightShiftAssign => "'>>='",
            PyToken::PowerAssign => "'**='",
            PyToken::IdivAssign => "'//='",
            PyToken::Eof => "EOF",
        }
    }
}

grammar_dispatch! {
    /// The Python3Subset grammar: the Python 3 dialect of data-model
    /// definitions, with `f'...{expr}...'` string templates.
    grammar Python3Subset = "Python3Subset" {
        tokens: PyToken,
        rules: PyRule,
        listener: PyListener => PyListenerAdapter,
        visitor: PyVisitor => PyVisitorAdapter,
    }
    rules {
        /// `(NEWLINE | stmt)* EOF`
        FileInput = "file_input" => file_input,
        /// `NEWLINE | simple_stmt | compound_stmt NEWLINE?`
        SingleInput = "single_input" => single_input,
        /// `testlist NEWLINE* EOF`
        EvalInput = "eval_input" => eval_input,
        /// `'@' dotted_name ('(' arglist? ')')? NEWLINE`
        Decorator = "decorator" => decorator,
        Decorators = "decorators" => decorators,
        /// `decorators (classdef | funcdef | async_funcdef)`
        Decorated = "decorated" => decorated,
        AsyncFuncdef = "async_funcdef" => async_funcdef,
        /// `'def' NAME parameters ('->' test)? ':' suite`
        Funcdef = "funcdef" => funcdef,
        Parameters = "parameters" => parameters,
        Typedargslist = "typedargslist" => typedargslist,
        /// `NAME (':' test)?`
        Tfpdef = "tfpdef" => tfpdef,
        Varargslist = "varargslist" => varargslist,
        Vfpdef = "vfpdef" => vfpdef,
        /// `simple_stmt | compound_stmt`
        Stmt = "stmt" => stmt,
        /// `small_stmt (';' small_stmt)* ';'? NEWLINE`
        SimpleStmt = "simple_stmt" => simple_stmt,
        SmallStmt = "small_stmt" => small_stmt,
        ExprStmt = "expr_stmt" => expr_stmt,
        Annassign = "annassign" => annassign,
        TestlistStarExpr = "testlist_star_expr" => testlist_star_expr,
        Augassign = "augassign" => augassign,
        DelStmt = "del_stmt" => del_stmt,
        PassStmt = "pass_stmt" => pass_stmt,
        FlowStmt = "flow_stmt" => flow_stmt,
        BreakStmt = "break_stmt" => break_stmt,
        ContinueStmt = "continue_stmt" => continue_stmt,
        ReturnStmt = "return_stmt" => return_stmt,
        YieldStmt = "yield_stmt" => yield_stmt,
        RaiseStmt = "raise_stmt" => raise_stmt,
        ImportStmt = "import_stmt" => import_stmt,
        ImportName = "import_name" => import_name,
        ImportFrom = "import_from" => import_from,
        ImportAsName = "import_as_name" => import_as_name,
        DottedAsName = "dotted_as_name" => dotted_as_name,
        ImportAsNames = "import_as_names" => import_as_names,
        DottedAsNames = "dotted_as_names" => dotted_as_names,
        DottedName = "dotted_name" => dotted_name,
        GlobalStmt = "global_stmt" => global_stmt,
        NonlocalStmt = "nonlocal_stmt" => nonlocal_stmt,
        AssertStmt = "assert_stmt" => assert_stmt,
        CompoundStmt = "compound_stmt" => compound_stmt,
        AsyncStmt = "async_stmt" => async_stmt,
        /// `'if' test ':' suite ('elif' test ':' suite)* ('else' ':' suite)?`
        IfStmt = "if_stmt" => if_stmt,
        WhileStmt = "while_stmt" => while_stmt,
        ForStmt = "for_stmt" => for_stmt,
        TryStmt = "try_stmt" => try_stmt,
        WithStmt = "with_stmt" => with_stmt,
        WithItem = "with_item" => with_item,
        ExceptClause = "except_clause" => except_clause,
        /// `simple_stmt | NEWLINE INDENT stmt+ DEDENT`
        Suite = "suite" => suite,
        /// `or_test ('if' or_test 'else' test)? | lambdef`
        Test = "test" => test,
        TestNocond = "test_nocond" => test_nocond,
        Lambdef = "lambdef" => lambdef,
        LambdefNocond = "lambdef_nocond" => lambdef_nocond,
        OrTest = "or_test" => or_test,
        AndTest = "and_test" => and_test,
        NotTest = "not_test" => not_test,
        Comparison = "comparison" => comparison,
        CompOp = "comp_op" => comp_op,
        StarExpr = "star_expr" => star_expr,
        Expr = "expr" => expr,
        XorExpr = "xor_expr" => xor_expr,
        AndExpr = "and_expr" => and_expr,
        ShiftExpr = "shift_expr" => shift_expr,
        ArithExpr = "arith_expr" => arith_expr,
        Term = "term" => term,
        Factor = "factor" => factor,
        Power = "power" => power,
        /// `AWAIT? atom trailer*`
        AtomExpr = "atom_expr" => atom_expr,
        /// Parenthesized forms, displays, names, literals and templates.
        Atom = "atom" => atom,
        TestlistComp = "testlist_comp" => testlist_comp,
        /// `callArguments | '[' subscriptlist ']' | '.' NAME`
        Trailer = "trailer" => trailer,
        Subscriptlist = "subscriptlist" => subscriptlist,
        Subscript = "subscript" => subscript,
        Sliceop = "sliceop" => sliceop,
        Exprlist = "exprlist" => exprlist,
        Testlist = "testlist" => testlist,
        Dictorsetmaker = "dictorsetmaker" => dictorsetmaker,
        /// `'class' NAME ('(' arglist? ')')? ':' suite`
        Classdef = "classdef" => classdef,
        /// `'(' arglist? ')'`
        CallArguments = "callArguments" => call_arguments,
        Arglist = "arglist" => arglist,
        /// `test comp_for? | test '=' test | '**' test | '*' test`
        Argument = "argument" => argument,
        CompIter = "comp_iter" => comp_iter,
        CompFor = "comp_for" => comp_for,
        CompIf = "comp_if" => comp_if,
        YieldExpr = "yield_expr" => yield_expr,
        YieldArg = "yield_arg" => yield_arg,
        /// A template start, its atoms and holes, and the matching end.
        StringTemplate = "string_template" => string_template,
        SingleStringTemplateAtom = "single_string_template_atom" => single_string_template_atom,
        DoubleStringTemplateAtom = "double_string_template_atom" => double_string_template_atom,
    }
}

/// A node of a Python3Subset tree.
pub type PyNode = Node<Python3Subset>;
