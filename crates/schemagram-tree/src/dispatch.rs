// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-grammar listener and visitor generation.
//!
//! [`grammar_dispatch!`](crate::grammar_dispatch) takes the rule table of one
//! grammar and emits, in the invoking module:
//!
//! - the grammar marker type and its [`Grammar`](crate::Grammar) impl
//! - the rule-kind enum with [`RuleKind`](crate::RuleKind)
//! - a listener trait with `enter_<rule>`/`exit_<rule>` defaults
//! - a visitor trait with `visit_<rule>` defaults that visit the children
//! - adapters mapping both traits onto [`ParseTreeListener`](crate::ParseTreeListener)
//!   and [`ParseTreeVisitor`](crate::ParseTreeVisitor)
//! - `walk`, `walk_with`, `visit` and `visit_children` for that grammar
//!
//! Dispatch is an exhaustive `match` over the grammar's own rule enum, so a
//! grammar can be added without touching any other.

/// Declare a grammar and generate its listener and visitor protocols.
///
/// ```
/// use schemagram_tree::{grammar_dispatch, TokenKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// pub enum CalcToken { Num, Plus }
///
/// impl TokenKind for CalcToken {
///     fn name(self) -> &'static str {
///         match self { CalcToken::Num => "NUM", CalcToken::Plus => "'+'" }
///     }
/// }
///
/// grammar_dispatch! {
///     /// A one-rule calculator.
///     grammar Calc = "Calc" {
///         tokens: CalcToken,
///         rules: CalcRule,
///         listener: CalcListener => CalcListenerAdapter,
///         visitor: CalcVisitor => CalcVisitorAdapter,
///     }
///     rules {
///         Sum = "sum" => sum,
///     }
/// }
///
/// struct Counter(usize);
///
/// impl CalcListener for Counter {
///     fn enter_sum(&mut self, _ctx: &schemagram_tree::WalkContext<'_, Calc>) -> schemagram_tree::CallbackResult {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
#[macro_export]
macro_rules! grammar_dispatch {
    (
        $(#[$grammar_meta:meta])*
        grammar $grammar:ident = $grammar_name:literal {
            tokens: $token:ty,
            rules: $rule:ident,
            listener: $listener:ident => $listener_adapter:ident,
            visitor: $visitor:ident => $visitor_adapter:ident $(,)?
        }
        rules {
            $(
                $(#[$meta:meta])*
                $variant:ident = $name:literal => $method:ident
            ),* $(,)?
        }
    ) => {
        $(#[$grammar_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $grammar;

        impl $crate::Grammar for $grammar {
            const NAME: &'static str = $grammar_name;
            type Rule = $rule;
            type Token = $token;
        }

        #[doc = concat!("Rule kinds of the ", $grammar_name, " grammar.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $rule {
            $(
                $(#[$meta])*
                $variant,
            )*
        }

        impl $crate::RuleKind for $rule {
            const ALL: &'static [Self] = &[$($rule::$variant,)*];

            fn name(self) -> &'static str {
                match self {
                    $($rule::$variant => $name,)*
                }
            }

            fn index(self) -> usize {
                self as usize
            }
        }

        impl ::core::fmt::Display for $rule {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::RuleKind::name(*self))
            }
        }

        $crate::__paste::paste! {
            // ----------------------------------------------------------------
            // Listener
            // ----------------------------------------------------------------

            #[doc = concat!("Listener for ", $grammar_name, " trees.")]
            #[doc = ""]
            #[doc = "Every callback defaults to a no-op. Walk with [`walk`] or [`walk_with`]."]
            #[allow(unused_variables)]
            pub trait $listener {
                /// Called on every rule node, before its kind-specific hook.
                fn enter_every_rule(
                    &mut self,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    Ok(())
                }

                /// Called on every rule node, after its kind-specific hook.
                fn exit_every_rule(
                    &mut self,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    Ok(())
                }

                /// Called on every terminal the parser accepted.
                fn visit_terminal(
                    &mut self,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    Ok(())
                }

                /// Called on every terminal produced by error recovery.
                fn visit_error_node(
                    &mut self,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    Ok(())
                }

                $(
                    #[doc = concat!("Enter a `", $name, "` node, before its children.")]
                    fn [<enter_ $method>](
                        &mut self,
                        ctx: &$crate::WalkContext<'_, $grammar>,
                    ) -> $crate::CallbackResult {
                        Ok(())
                    }

                    #[doc = concat!("Exit a `", $name, "` node, after its children.")]
                    fn [<exit_ $method>](
                        &mut self,
                        ctx: &$crate::WalkContext<'_, $grammar>,
                    ) -> $crate::CallbackResult {
                        Ok(())
                    }
                )*
            }

            #[doc = concat!("Presents a [`", stringify!($listener), "`] to the generic walker.")]
            pub struct $listener_adapter<'l, L: ?Sized> {
                listener: &'l mut L,
            }

            impl<'l, L: $listener + ?Sized> $listener_adapter<'l, L> {
                pub fn new(listener: &'l mut L) -> Self {
                    Self { listener }
                }
            }

            impl<'l, L: $listener + ?Sized> $crate::ParseTreeListener<$grammar>
                for $listener_adapter<'l, L>
            {
                fn enter_every_rule(
                    &mut self,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    self.listener.enter_every_rule(ctx)
                }

                fn exit_every_rule(
                    &mut self,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    self.listener.exit_every_rule(ctx)
                }

                fn visit_terminal(
                    &mut self,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    self.listener.visit_terminal(ctx)
                }

                fn visit_error_node(
                    &mut self,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    self.listener.visit_error_node(ctx)
                }

                fn enter_rule(
                    &mut self,
                    rule: $rule,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    match rule {
                        $($rule::$variant => self.listener.[<enter_ $method>](ctx),)*
                    }
                }

                fn exit_rule(
                    &mut self,
                    rule: $rule,
                    ctx: &$crate::WalkContext<'_, $grammar>,
                ) -> $crate::CallbackResult {
                    match rule {
                        $($rule::$variant => self.listener.[<exit_ $method>](ctx),)*
                    }
                }
            }

            #[doc = concat!("Walk a ", $grammar_name, " tree, notifying `listeners` in order.")]
            pub fn walk(
                root: &$crate::Node<$grammar>,
                listeners: &mut [&mut dyn $listener],
            ) -> ::core::result::Result<(), $crate::TraversalError> {
                walk_with(&$crate::ParseTreeWalker::new(), root, listeners)
            }

            /// Like [`walk`], with a configured walker.
            pub fn walk_with(
                walker: &$crate::ParseTreeWalker,
                root: &$crate::Node<$grammar>,
                listeners: &mut [&mut dyn $listener],
            ) -> ::core::result::Result<(), $crate::TraversalError> {
                let mut adapters: ::std::vec::Vec<_> = listeners
                    .iter_mut()
                    .map(|listener| $listener_adapter::new(&mut **listener))
                    .collect();
                let mut generic: ::std::vec::Vec<&mut dyn $crate::ParseTreeListener<$grammar>> =
                    adapters
                        .iter_mut()
                        .map(|adapter| adapter as &mut dyn $crate::ParseTreeListener<$grammar>)
                        .collect();
                walker.walk(root, &mut generic)
            }

            // ----------------------------------------------------------------
            // Visitor
            // ----------------------------------------------------------------

            #[doc = concat!("Visitor for ", $grammar_name, " trees, producing results of type `R`.")]
            #[doc = ""]
            #[doc = "Every `visit_` callback defaults to [`visit_children`]. Start with [`visit`]."]
            #[allow(unused_variables)]
            pub trait $visitor<R> {
                /// The "no result" value every fold starts from.
                fn default_result(&mut self) -> R;

                /// Combine the result so far with the next child's. Keeps `next`.
                fn aggregate_result(&mut self, aggregate: R, next: R) -> R {
                    next
                }

                /// Whether to continue with the next child of `node`.
                fn should_visit_next_child(
                    &mut self,
                    node: &$crate::Node<$grammar>,
                    current: &R,
                ) -> bool {
                    true
                }

                /// Nodes deeper than this are rejected.
                fn max_depth(&self) -> Option<usize> {
                    None
                }

                /// Called for terminals the parser accepted.
                fn visit_terminal(
                    &mut self,
                    node: &$crate::Node<$grammar>,
                ) -> $crate::CallbackResult<R> {
                    Ok(self.default_result())
                }

                /// Called for terminals produced by error recovery.
                fn visit_error_node(
                    &mut self,
                    node: &$crate::Node<$grammar>,
                ) -> $crate::CallbackResult<R> {
                    Ok(self.default_result())
                }

                $(
                    #[doc = concat!("Visit a `", $name, "` node. Defaults to visiting its children.")]
                    fn [<visit_ $method>](
                        &mut self,
                        node: &$crate::Node<$grammar>,
                    ) -> $crate::CallbackResult<R> {
                        Ok(visit_children(self, node)?)
                    }
                )*
            }

            #[doc = concat!("Presents a [`", stringify!($visitor), "`] to the generic visit functions.")]
            pub struct $visitor_adapter<'v, V: ?Sized, R> {
                visitor: &'v mut V,
                result: ::core::marker::PhantomData<fn() -> R>,
            }

            impl<'v, R, V: $visitor<R> + ?Sized> $visitor_adapter<'v, V, R> {
                pub fn new(visitor: &'v mut V) -> Self {
                    Self {
                        visitor,
                        result: ::core::marker::PhantomData,
                    }
                }
            }

            impl<'v, R, V: $visitor<R> + ?Sized> $crate::ParseTreeVisitor<$grammar, R>
                for $visitor_adapter<'v, V, R>
            {
                fn visit_rule(
                    &mut self,
                    rule: $rule,
                    node: &$crate::Node<$grammar>,
                ) -> $crate::CallbackResult<R> {
                    match rule {
                        $($rule::$variant => self.visitor.[<visit_ $method>](node),)*
                    }
                }

                fn default_result(&mut self) -> R {
                    self.visitor.default_result()
                }

                fn aggregate_result(&mut self, aggregate: R, next: R) -> R {
                    self.visitor.aggregate_result(aggregate, next)
                }

                fn should_visit_next_child(
                    &mut self,
                    node: &$crate::Node<$grammar>,
                    current: &R,
                ) -> bool {
                    self.visitor.should_visit_next_child(node, current)
                }

                fn visit_terminal(
                    &mut self,
                    node: &$crate::Node<$grammar>,
                ) -> $crate::CallbackResult<R> {
                    self.visitor.visit_terminal(node)
                }

                fn visit_error_node(
                    &mut self,
                    node: &$crate::Node<$grammar>,
                ) -> $crate::CallbackResult<R> {
                    self.visitor.visit_error_node(node)
                }

                fn max_depth(&self) -> Option<usize> {
                    self.visitor.max_depth()
                }
            }

            #[doc = concat!("Dispatch a [`", stringify!($visitor), "`] on `node`.")]
            pub fn visit<R, V>(
                visitor: &mut V,
                node: &$crate::Node<$grammar>,
            ) -> ::core::result::Result<R, $crate::TraversalError>
            where
                V: $visitor<R> + ?Sized,
            {
                $crate::visit(&mut $visitor_adapter::new(visitor), node)
            }

            /// Visit the children of `node` and fold their results.
            pub fn visit_children<R, V>(
                visitor: &mut V,
                node: &$crate::Node<$grammar>,
            ) -> ::core::result::Result<R, $crate::TraversalError>
            where
                V: $visitor<R> + ?Sized,
            {
                $crate::visit_children(&mut $visitor_adapter::new(visitor), node)
            }
        }
    };
}
