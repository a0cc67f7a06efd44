use super::cursor::Cursor;
use super::error::{ParseErr, Result};
use crate::value::{DataType, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Create {
        table: Box<str>,
        columns: Vec<(Box<str>, DataType)>,
    },
    Insert {
        table: Box<str>,
        /// Explicit column-name list; `None` maps values positionally
        /// onto the table-definition order.
        columns: Option<Vec<Box<str>>>,
        values: Vec<Value>,
    },
    Select {
        table: Box<str>,
        /// `None` means `*`.
        columns: Option<Vec<Box<str>>>,
        filter: Option<Cmp>,
    },
}

/// A single WHERE comparison. The grammar allows no boolean connectives.
#[derive(Debug, Clone, PartialEq)]
pub struct Cmp {
    pub lhs: Atom,
    pub op: Op,
    pub rhs: Atom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Gt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Lit(Value),
    Ident(Box<str>),
}

pub struct Parser<'a> {
    cur: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Parser {
            cur: Cursor::new(src),
        }
    }

    /// Parses exactly one statement, terminated by end of input or a
    /// single trailing `;`.
    pub fn parse(mut self) -> Result<Stmt> {
        self.cur.skip_ws();
        let stmt = if self.cur.try_keyword("create") {
            self.create()?
        } else if self.cur.try_keyword("insert") {
            self.insert()?
        } else if self.cur.try_keyword("select") {
            self.select()?
        } else {
            return Err(ParseErr::Expected {
                expected: "CREATE, INSERT or SELECT",
                at: self.cur.pos(),
            });
        };
        self.cur.end()?;
        Ok(stmt)
    }

    /// Runs a sub-parse, rewinding the cursor and reporting `None` if it
    /// fails. The only recovery mechanism in the grammar; every other
    /// failure aborts the whole statement.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Option<T> {
        let save = self.cur.pos();
        match f(self) {
            Ok(v) => Some(v),
            Err(_) => {
                self.cur.rewind(save);
                None
            }
        }
    }

    fn create(&mut self) -> Result<Stmt> {
        self.cur.skip_ws();
        self.cur.keyword("table")?;
        self.cur.skip_ws();
        let table = self.cur.ident()?.into();
        self.cur.skip_ws();
        self.expect('(')?;
        let mut columns = Vec::new();
        loop {
            self.cur.skip_ws();
            let name = self.cur.ident()?.into();
            self.cur.skip_ws();
            let ty = self.data_type()?;
            columns.push((name, ty));
            self.cur.skip_ws();
            if !self.list_continues()? {
                break;
            }
        }
        Ok(Stmt::Create { table, columns })
    }

    fn insert(&mut self) -> Result<Stmt> {
        self.cur.skip_ws();
        self.cur.keyword("into")?;
        self.cur.skip_ws();
        let table = self.cur.ident()?.into();
        let columns = self.attempt(|p| {
            p.cur.skip_ws();
            p.expect('(')?;
            let mut names = Vec::new();
            loop {
                p.cur.skip_ws();
                names.push(p.cur.ident()?.into());
                p.cur.skip_ws();
                if !p.list_continues()? {
                    break;
                }
            }
            Ok(names)
        });
        self.cur.skip_ws();
        self.cur.keyword("values")?;
        self.cur.skip_ws();
        self.expect('(')?;
        let mut values = Vec::new();
        loop {
            self.cur.skip_ws();
            values.push(self.value()?);
            self.cur.skip_ws();
            if !self.list_continues()? {
                break;
            }
        }
        Ok(Stmt::Insert {
            table,
            columns,
            values,
        })
    }

    fn select(&mut self) -> Result<Stmt> {
        self.cur.skip_ws();
        let columns = if self.cur.curr()? == '*' {
            self.cur.walk()?;
            None
        } else {
            let mut names = vec![self.cur.ident()?.into()];
            loop {
                self.cur.skip_ws();
                if self.cur.curr() == Ok(',') {
                    self.cur.walk()?;
                    self.cur.skip_ws();
                    names.push(self.cur.ident()?.into());
                } else {
                    break;
                }
            }
            Some(names)
        };
        self.cur.skip_ws();
        self.cur.keyword("from")?;
        self.cur.skip_ws();
        let table = self.cur.ident()?.into();
        let filter = self.attempt(|p| {
            p.cur.skip_ws();
            p.cur.keyword("where")?;
            p.cur.skip_ws();
            let lhs = p.atom()?;
            p.cur.skip_ws();
            let op = p.op()?;
            p.cur.skip_ws();
            let rhs = p.atom()?;
            Ok(Cmp { lhs, op, rhs })
        });
        Ok(Stmt::Select {
            table,
            columns,
            filter,
        })
    }

    /// Consumes `,` (more elements follow) or `)` (list done).
    fn list_continues(&mut self) -> Result<bool> {
        let at = self.cur.pos();
        match self.cur.walk()? {
            ',' => Ok(true),
            ')' => Ok(false),
            _ => Err(ParseErr::Expected {
                expected: "`,` or `)`",
                at,
            }),
        }
    }

    fn data_type(&mut self) -> Result<DataType> {
        if self.cur.try_keyword("int") {
            Ok(DataType::Int)
        } else if self.cur.try_keyword("text") {
            Ok(DataType::Text)
        } else {
            Err(ParseErr::Expected {
                expected: "INT or TEXT",
                at: self.cur.pos(),
            })
        }
    }

    /// `'...'` (no escapes) or an unsigned decimal integer.
    fn value(&mut self) -> Result<Value> {
        let at = self.cur.pos();
        match self.cur.curr()? {
            '\'' => {
                self.cur.walk()?;
                let text = self.cur.take_while(|c| c != '\'').to_owned();
                if self.cur.finished() {
                    return Err(ParseErr::UnterminatedText(at));
                }
                self.cur.walk()?;
                Ok(Value::Text(text))
            }
            ch if ch.is_ascii_digit() => {
                let digits = self.cur.take_while(|c| c.is_ascii_digit());
                digits
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| ParseErr::InvalidNum(at, digits.to_string()))
            }
            _ => Err(ParseErr::Expected {
                expected: "value literal",
                at,
            }),
        }
    }

    fn atom(&mut self) -> Result<Atom> {
        match self.cur.curr()? {
            '\'' => Ok(Atom::Lit(self.value()?)),
            ch if ch.is_ascii_digit() => Ok(Atom::Lit(self.value()?)),
            _ => Ok(Atom::Ident(self.cur.ident()?.into())),
        }
    }

    fn op(&mut self) -> Result<Op> {
        let at = self.cur.pos();
        match self.cur.walk()? {
            '=' => Ok(Op::Eq),
            '<' => Ok(Op::Lt),
            '>' => Ok(Op::Gt),
            _ => Err(ParseErr::Expected {
                expected: "`=`, `<` or `>`",
                at,
            }),
        }
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        let at = self.cur.pos();
        if self.cur.walk()? == ch {
            Ok(())
        } else {
            Err(ParseErr::Expected {
                expected: match ch {
                    '(' => "`(`",
                    ')' => "`)`",
                    _ => "punctuation",
                },
                at,
            })
        }
    }
}
