use crate::host::Host;
use crate::object::Object;
use std::cell::Ref;
use std::fmt;
use std::path::Path;

pub type BuiltinFunction = fn(&mut dyn Host, Vec<Object>) -> Object;

pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFunction,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// The fixed builtin registry. Entries are `'static`, so an
/// `Object::Builtin` is just a reference into this table.
pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "len", func: len },
    Builtin { name: "first", func: first },
    Builtin { name: "last", func: last },
    Builtin { name: "rest", func: rest },
    Builtin { name: "push", func: push },
    Builtin { name: "pop", func: pop },
    Builtin { name: "print", func: print },
    Builtin { name: "input", func: input },
    Builtin { name: "exit", func: exit },
    Builtin { name: "read", func: read },
    Builtin { name: "write", func: write },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

fn wrong_arity(got: usize, want: &str) -> Object {
    Object::error(format!("wrong number of arguments. got={}, want={}", got, want))
}

fn check_arity(args: &[Object], want: usize) -> Result<(), Object> {
    if args.len() == want {
        Ok(())
    } else {
        Err(wrong_arity(args.len(), &want.to_string()))
    }
}

/// Borrows the array behind `arg`; callers that build a new array copy it.
fn expect_array<'a>(name: &str, arg: &'a Object) -> Result<Ref<'a, Vec<Object>>, Object> {
    match arg {
        Object::Array(elements) => Ok(elements.borrow()),
        other => Err(Object::error(format!(
            "argument to `{}` must be ARRAY, got {}",
            name,
            other.kind()
        ))),
    }
}

fn expect_string<'a>(name: &str, arg: &'a Object) -> Result<&'a str, Object> {
    match arg {
        Object::String(s) => Ok(s),
        other => Err(Object::error(format!(
            "argument to `{}` must be STRING, got {}",
            name,
            other.kind()
        ))),
    }
}

/// Lets the builtin bodies use `?` on their validation helpers.
fn run(body: impl FnOnce() -> Result<Object, Object>) -> Object {
    body().unwrap_or_else(|error| error)
}

fn len(_host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        check_arity(&args, 1)?;
        match &args[0] {
            Object::String(s) => Ok(Object::Integer(s.chars().count() as i64)),
            Object::Array(elements) => Ok(Object::Integer(elements.borrow().len() as i64)),
            other => Err(Object::error(format!(
                "argument to `len` not supported, got {}",
                other.kind()
            ))),
        }
    })
}

fn first(_host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        check_arity(&args, 1)?;
        let elements = expect_array("first", &args[0])?;
        Ok(elements.first().cloned().unwrap_or(Object::NULL))
    })
}

fn last(_host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        check_arity(&args, 1)?;
        let elements = expect_array("last", &args[0])?;
        Ok(elements.last().cloned().unwrap_or(Object::NULL))
    })
}

fn rest(_host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        check_arity(&args, 1)?;
        let elements = expect_array("rest", &args[0])?;
        if elements.is_empty() {
            return Ok(Object::NULL);
        }
        Ok(Object::array(elements[1..].to_vec()))
    })
}

fn push(_host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        check_arity(&args, 2)?;
        let mut elements = expect_array("push", &args[0])?.to_vec();
        elements.push(args[1].clone());
        Ok(Object::array(elements))
    })
}

fn pop(_host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        check_arity(&args, 1)?;
        match &args[0] {
            Object::Array(elements) => elements
                .borrow_mut()
                .pop()
                .ok_or_else(|| Object::error("pop from empty array")),
            other => Err(Object::error(format!(
                "argument to `pop` must be ARRAY, got {}",
                other.kind()
            ))),
        }
    })
}

fn print(host: &mut dyn Host, args: Vec<Object>) -> Object {
    for arg in &args {
        host.write(&format!("{}\n", arg));
    }
    Object::NULL
}

fn input(host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        if args.len() > 1 {
            return Err(wrong_arity(args.len(), "0 or 1"));
        }
        if let Some(prompt) = args.first() {
            host.write(&prompt.to_string());
        }
        Ok(host.read_line().map(Object::String).unwrap_or(Object::NULL))
    })
}

fn exit(host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        let code = match args.as_slice() {
            [] => 0,
            [Object::Integer(code)] => i32::try_from(*code)
                .map_err(|_| Object::error(format!("exit code out of range: {}", code)))?,
            [other] => {
                return Err(Object::error(format!(
                    "argument to `exit` must be INTEGER, got {}",
                    other.kind()
                )))
            }
            _ => return Err(wrong_arity(args.len(), "0 or 1")),
        };
        host.exit(code);
        Ok(Object::NULL)
    })
}

fn read(host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        check_arity(&args, 1)?;
        let path = expect_string("read", &args[0])?;
        host.read_file(Path::new(path))
            .map(Object::String)
            .map_err(|error| {
                tracing::debug!(path, %error, "read failed");
                Object::error(format!("could not read file: {}", path))
            })
    })
}

fn write(host: &mut dyn Host, args: Vec<Object>) -> Object {
    run(|| {
        check_arity(&args, 2)?;
        let path = expect_string("write", &args[0])?;
        let contents = args[1].to_string();
        host.write_file(Path::new(path), &contents)
            .map(|_| Object::NULL)
            .map_err(|error| Object::error(format!("could not write file {}: {}", path, error)))
    })
}
