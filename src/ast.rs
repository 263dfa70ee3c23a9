use crate::expr::Expr;
use crate::literal::Literal;
use crate::stmt::Stmt;

/// Renders an AST back to Lox source text. Used to test the round-trip
/// property: parsing the output should reproduce a semantically
/// equivalent program.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print_statements(statements: &[Stmt]) -> String {
        statements.iter().map(Self::print_stmt).collect::<Vec<_>>().join(" ")
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Block(block) => format!("{{ {} }}", Self::print_statements(&block.statements)),
            Stmt::Class(class_stmt) => {
                let mut out = format!("class {}", class_stmt.name.lexeme);
                if let Some(superclass) = &class_stmt.superclass {
                    out += &format!(" < {}", Self::print_expr(superclass));
                }
                out += " { ";
                for method in &class_stmt.methods {
                    out += &Self::print_function(&method.name.lexeme, &method.params, &method.body);
                    out += " ";
                }
                for method in &class_stmt.static_methods {
                    out += "class ";
                    out += &Self::print_function(&method.name.lexeme, &method.params, &method.body);
                    out += " ";
                }
                out += "}";
                out
            }
            Stmt::Expression(expression_stmt) => format!("{};", Self::print_expr(&expression_stmt.expr)),
            Stmt::Function(function) => format!("fun {}", Self::print_function(&function.name.lexeme, &function.params, &function.body)),
            Stmt::If(if_stmt) => {
                let mut out = format!("if ({}) {}", Self::print_expr(&if_stmt.condition), Self::print_stmt(&if_stmt.then_branch));
                if let Some(else_branch) = &if_stmt.else_branch {
                    out += &format!(" else {}", Self::print_stmt(else_branch));
                }
                out
            }
            Stmt::Print(print_stmt) => format!("print {};", Self::print_expr(&print_stmt.expr)),
            Stmt::Return(return_stmt) => match &return_stmt.value {
                Some(value) => format!("return {};", Self::print_expr(value)),
                None => "return;".to_string(),
            },
            Stmt::Var(var_stmt) => match &var_stmt.initializer {
                Some(initializer) => format!("var {} = {};", var_stmt.name.lexeme, Self::print_expr(initializer)),
                None => format!("var {};", var_stmt.name.lexeme),
            },
            Stmt::While(while_stmt) => format!("while ({}) {}", Self::print_expr(&while_stmt.condition), Self::print_stmt(&while_stmt.body)),
        }
    }

    fn print_function(name: &str, params: &[crate::token::Token], body: &[Stmt]) -> String {
        let params = params.iter().map(|p| p.lexeme.as_str()).collect::<Vec<_>>().join(", ");
        format!("{name}({params}) {{ {} }}", Self::print_statements(body))
    }

    pub fn print_expr(expr: &Expr) -> String {
        match expr {
            Expr::Assign(assign) => format!("{} = {}", assign.name.lexeme, Self::print_expr(&assign.value)),
            Expr::Binary(binary) => format!("({} {} {})", Self::print_expr(&binary.left), binary.operator.lexeme, Self::print_expr(&binary.right)),
            Expr::Call(call) => {
                let arguments = call.arguments.iter().map(Self::print_expr).collect::<Vec<_>>().join(", ");
                format!("{}({arguments})", Self::print_expr(&call.callee))
            }
            Expr::Function(function_expr) => {
                let params = function_expr.params.iter().map(|p| p.lexeme.as_str()).collect::<Vec<_>>().join(", ");
                format!("fun ({params}) {{ {} }}", Self::print_statements(&function_expr.body))
            }
            Expr::Get(get) => format!("{}.{}", Self::print_expr(&get.object), get.name.lexeme),
            Expr::Grouping(grouping) => format!("({})", Self::print_expr(&grouping.expression)),
            Expr::Literal(literal) => Self::print_literal(literal),
            Expr::Logical(logical) => format!("({} {} {})", Self::print_expr(&logical.left), logical.operator.lexeme, Self::print_expr(&logical.right)),
            Expr::Set(set) => format!("{}.{} = {}", Self::print_expr(&set.object), set.name.lexeme, Self::print_expr(&set.value)),
            Expr::Super(super_expr) => format!("super.{}", super_expr.method.lexeme),
            Expr::This(_) => "this".to_string(),
            Expr::Unary(unary) => format!("({}{})", unary.operator.lexeme, Self::print_expr(&unary.right)),
            Expr::Variable(variable) => variable.name.lexeme.clone(),
        }
    }

    fn print_literal(literal: &Literal) -> String {
        match literal {
            Literal::String(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }
}
