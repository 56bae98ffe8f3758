use crate::ast::{BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement};
use crate::builtins;
use crate::environment::{Env, Environment};
use crate::host::{Host, StdHost};
use crate::object::{Function, HashObject, HashPair, Object};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Evaluates `$e` and returns early from the enclosing function when the
/// result is an error or a pending `return`.
macro_rules! try_eval {
    ($e:expr) => {
        match $e {
            unwinding @ (Object::Error(_) | Object::Return(_)) => return unwinding,
            value => value,
        }
    };
}

fn runtime_error(message: String) -> Object {
    tracing::debug!(%message, "runtime error");
    Object::Error(message)
}

fn unwrap_return(object: Object) -> Object {
    match object {
        Object::Return(value) => *value,
        other => other,
    }
}

/// Tree-walking interpreter. Failures are returned as `Object::Error` values
/// and travel up through every enclosing evaluation unchanged.
pub struct Evaluator<H: Host = StdHost> {
    host: H,
}

impl Evaluator<StdHost> {
    pub fn new() -> Self {
        Self { host: StdHost }
    }
}

impl Default for Evaluator<StdHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Evaluator<H> {
    pub fn with_host(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Runs every statement; a top-level `return` ends the program with its
    /// value and the first error ends it with that error.
    pub fn eval_program(&mut self, program: &Program, env: &Env) -> Object {
        let mut result = Object::NULL;

        for statement in &program.statements {
            result = self.eval_statement(statement, env);
            match result {
                Object::Return(value) => return *value,
                Object::Error(_) => return result,
                _ => {}
            }
        }

        result
    }

    /// Blocks share the enclosing scope. A `return` or error stops the block
    /// and is handed back still wrapped, so the caller can keep unwinding.
    pub fn eval_block(&mut self, block: &BlockStatement, env: &Env) -> Object {
        let mut result = Object::NULL;

        for statement in &block.statements {
            result = try_eval!(self.eval_statement(statement, env));
        }

        result
    }

    pub fn eval_statement(&mut self, statement: &Statement, env: &Env) -> Object {
        match statement {
            Statement::Var { name, value, .. } => self.eval_declaration(name, value, env, false),
            Statement::Val { name, value, .. } => self.eval_declaration(name, value, env, true),
            Statement::Return { value, .. } => {
                let value = try_eval!(self.eval_expression(value, env));
                Object::Return(Box::new(value))
            }
            Statement::Expression { expression, .. } => self.eval_expression(expression, env),
        }
    }

    fn eval_declaration(&mut self, name: &Identifier, value: &Expression, env: &Env, constant: bool) -> Object {
        let value = try_eval!(self.eval_expression(value, env));

        let declared = if constant {
            env.borrow_mut().set_constant(&name.value, value)
        } else {
            env.borrow_mut().set_variable(&name.value, value)
        };

        match declared {
            Ok(_) => Object::NULL,
            Err(message) => runtime_error(message),
        }
    }

    pub fn eval_expression(&mut self, expression: &Expression, env: &Env) -> Object {
        match expression {
            Expression::Identifier(ident) => self.eval_identifier(ident, env),
            Expression::IntegerLiteral { value, .. } => Object::Integer(*value),
            Expression::StringLiteral { value, .. } => Object::String(value.clone()),
            Expression::Boolean { value, .. } => Object::from_bool(*value),
            Expression::Prefix { operator, right, .. } => {
                let right = try_eval!(self.eval_expression(right, env));
                self.eval_prefix(*operator, right)
            }
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => {
                let left = try_eval!(self.eval_expression(left, env));
                let right = try_eval!(self.eval_expression(right, env));
                self.eval_infix(*operator, left, right)
            }
            Expression::Assign { name, value, .. } => {
                let value = try_eval!(self.eval_expression(value, env));
                let assigned = env.borrow_mut().assign(&name.value, value);
                assigned.unwrap_or_else(runtime_error)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = try_eval!(self.eval_expression(condition, env));
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Object::NULL
                }
            }
            Expression::While { condition, body, .. } => {
                let mut result = Object::NULL;
                loop {
                    let condition = try_eval!(self.eval_expression(condition, env));
                    if !condition.is_truthy() {
                        break;
                    }
                    result = try_eval!(self.eval_block(body, env));
                }
                result
            }
            Expression::FunctionLiteral { parameters, body, .. } => Object::Function(Rc::new(Function {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            })),
            Expression::Call {
                function, arguments, ..
            } => {
                let function = try_eval!(self.eval_expression(function, env));
                let arguments = match self.eval_expressions(arguments, env) {
                    Ok(arguments) => arguments,
                    Err(unwinding) => return unwinding,
                };
                self.apply_function(function, arguments)
            }
            Expression::ArrayLiteral { elements, .. } => match self.eval_expressions(elements, env) {
                Ok(elements) => Object::array(elements),
                Err(unwinding) => unwinding,
            },
            Expression::Index { left, index, .. } => {
                let left = try_eval!(self.eval_expression(left, env));
                let index = try_eval!(self.eval_expression(index, env));
                self.eval_index(left, index)
            }
            Expression::HashLiteral { pairs, .. } => self.eval_hash_literal(pairs, env),
        }
    }

    /// Evaluates left to right, stopping at the first error.
    fn eval_expressions(&mut self, expressions: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
        let mut values = Vec::with_capacity(expressions.len());

        for expression in expressions {
            match self.eval_expression(expression, env) {
                unwinding @ (Object::Error(_) | Object::Return(_)) => return Err(unwinding),
                value => values.push(value),
            }
        }

        Ok(values)
    }

    fn eval_identifier(&self, ident: &Identifier, env: &Env) -> Object {
        if let Some(value) = env.borrow().get(&ident.value) {
            return value;
        }

        match builtins::lookup(&ident.value) {
            Some(builtin) => Object::Builtin(builtin),
            None => runtime_error(format!("identifier not found: {}", ident.value)),
        }
    }

    fn eval_prefix(&self, operator: PrefixOperator, right: Object) -> Object {
        match operator {
            PrefixOperator::Not => match right {
                Object::Boolean(value) => Object::from_bool(!value),
                Object::Null => Object::TRUE,
                _ => Object::FALSE,
            },
            PrefixOperator::Negate => match right {
                Object::Integer(value) => Object::Integer(value.wrapping_neg()),
                other => runtime_error(format!("unknown operator: -{}", other.kind())),
            },
        }
    }

    fn eval_infix(&self, operator: InfixOperator, left: Object, right: Object) -> Object {
        match (&left, &right) {
            (Object::Integer(l), Object::Integer(r)) => self.eval_integer_infix(operator, *l, *r),
            (Object::String(l), Object::String(r)) => match operator {
                InfixOperator::Add => Object::String(format!("{}{}", l, r)),
                _ => runtime_error(format!("unknown operator: STRING {} STRING", operator)),
            },
            (Object::String(text), Object::Integer(count)) | (Object::Integer(count), Object::String(text))
                if operator == InfixOperator::Multiply =>
            {
                repeat_string(text, *count)
            }
            _ if left.kind() == right.kind() && operator == InfixOperator::Equal => {
                Object::from_bool(left.same_object(&right))
            }
            _ if left.kind() == right.kind() && operator == InfixOperator::NotEqual => {
                Object::from_bool(!left.same_object(&right))
            }
            _ if left.kind() != right.kind() => runtime_error(format!(
                "type mismatch: {} {} {}",
                left.kind(),
                operator,
                right.kind()
            )),
            _ => runtime_error(format!(
                "unknown operator: {} {} {}",
                left.kind(),
                operator,
                right.kind()
            )),
        }
    }

    /// Integer arithmetic wraps on overflow; division and remainder by zero
    /// are errors.
    fn eval_integer_infix(&self, operator: InfixOperator, left: i64, right: i64) -> Object {
        match operator {
            InfixOperator::Add => Object::Integer(left.wrapping_add(right)),
            InfixOperator::Subtract => Object::Integer(left.wrapping_sub(right)),
            InfixOperator::Multiply => Object::Integer(left.wrapping_mul(right)),
            InfixOperator::Divide | InfixOperator::Modulo if right == 0 => {
                runtime_error("division by zero".to_string())
            }
            InfixOperator::Divide => Object::Integer(left.wrapping_div(right)),
            InfixOperator::Modulo => Object::Integer(left.wrapping_rem(right)),
            InfixOperator::BitAnd => Object::Integer(left & right),
            InfixOperator::BitOr => Object::Integer(left | right),
            InfixOperator::BitXor => Object::Integer(left ^ right),
            InfixOperator::Equal => Object::from_bool(left == right),
            InfixOperator::NotEqual => Object::from_bool(left != right),
            InfixOperator::Less => Object::from_bool(left < right),
            InfixOperator::LessEqual => Object::from_bool(left <= right),
            InfixOperator::Greater => Object::from_bool(left > right),
            InfixOperator::GreaterEqual => Object::from_bool(left >= right),
        }
    }

    fn eval_index(&self, left: Object, index: Object) -> Object {
        match (&left, &index) {
            (Object::Array(elements), Object::Integer(i)) => {
                let elements = elements.borrow();
                let element = usize::try_from(*i).ok().and_then(|i| elements.get(i).cloned());
                element.unwrap_or(Object::NULL)
            }
            (Object::String(text), Object::Integer(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| text.chars().nth(i))
                .map(|c| Object::String(c.to_string()))
                .unwrap_or(Object::NULL),
            (Object::Hash(hash), _) => match index.hash_key() {
                Some(key) => hash
                    .pairs
                    .get(&key)
                    .map(|pair| pair.value.clone())
                    .unwrap_or(Object::NULL),
                None => runtime_error(format!("unusable as hash key: {}", index.kind())),
            },
            _ => runtime_error(format!("index operator not supported: {}", left.kind())),
        }
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expression, Expression)], env: &Env) -> Object {
        let mut map = FxHashMap::default();

        for (key_expression, value_expression) in pairs {
            let key = try_eval!(self.eval_expression(key_expression, env));
            let hash_key = match key.hash_key() {
                Some(hash_key) => hash_key,
                None => return runtime_error(format!("unusable as hash key: {}", key.kind())),
            };
            let value = try_eval!(self.eval_expression(value_expression, env));
            map.insert(hash_key, HashPair { key, value });
        }

        Object::Hash(Rc::new(HashObject { pairs: map }))
    }

    /// Calls a user function in a fresh scope enclosed by the function's
    /// captured environment, or hands the arguments to a builtin.
    #[tracing::instrument(level = "trace", skip_all, fields(callee = %function.kind(), args = arguments.len()))]
    pub fn apply_function(&mut self, function: Object, arguments: Vec<Object>) -> Object {
        match function {
            Object::Function(function) => {
                if function.parameters.len() != arguments.len() {
                    return runtime_error(format!(
                        "wrong number of arguments: want={}, got={}",
                        function.parameters.len(),
                        arguments.len()
                    ));
                }

                let scope = Environment::new_enclosed(&function.env);
                for (parameter, argument) in function.parameters.iter().zip(arguments) {
                    if let Err(message) = scope.borrow_mut().set_variable(&parameter.value, argument) {
                        return runtime_error(message);
                    }
                }

                unwrap_return(self.eval_block(&function.body, &scope))
            }
            Object::Builtin(builtin) => {
                tracing::trace!(name = builtin.name, "calling builtin");
                (builtin.func)(&mut self.host, arguments)
            }
            other => runtime_error(format!("not a function: {}", other.kind())),
        }
    }
}

/// Largest string `*` may build, in bytes.
pub const MAX_REPEAT_BYTES: usize = 1 << 30;

fn repeat_string(text: &str, count: i64) -> Object {
    let count = usize::try_from(count).unwrap_or(0);
    match text.len().checked_mul(count) {
        Some(size) if size <= MAX_REPEAT_BYTES => Object::String(text.repeat(count)),
        _ => runtime_error(format!("string repetition too large: {}", count)),
    }
}
