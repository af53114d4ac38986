//! Registration macros for ops.

/// Defines an op and submits it for discovery.
///
/// Expands to `pub static OP_<NAME>: OpDef` plus an `inventory` submission,
/// so the op is found by [`crate::OpEnvironmentBuilder::with_discovered`]
/// and by [`crate::OpEnvironment::global`].
///
/// ```ignore
/// imops_registry::op!(double_it, {
///     name: "math.double",
///     variant: HYBRID,
///     signature: || OpSignature::new().input::<DoubleType>().output::<DoubleType>(),
///     factory: |_env, _args| Ok(HybridCell::new(Double).boxed()),
/// });
/// ```
#[macro_export]
macro_rules! op {
	($(#[$attr:meta])* $ident:ident, {
		name: $name:expr,
		variant: $variant:ident,
		$(description: $desc:expr,)?
		$(priority: $priority:expr,)?
		$(dims: $min:expr => $max:expr,)?
		$(source: $source:expr,)?
		signature: $sig:expr,
		factory: $factory:expr $(,)?
	}) => {
		$crate::__private::paste::paste! {
			$(#[$attr])*
			pub static [<OP_ $ident:upper>]: $crate::OpDef = $crate::OpDef {
				meta: $crate::OpMeta {
					id: concat!(env!("CARGO_PKG_NAME"), "::", stringify!($ident)),
					name: $name,
					description: $crate::__op_opt!($({$desc})?, ""),
					priority: $crate::__op_opt!($({$priority})?, $crate::Priority::NORMAL),
					source: $crate::__op_opt!(
						$({$source})?,
						$crate::OpSource::Crate(env!("CARGO_PKG_NAME"))
					),
					variant: $crate::Variant::$variant,
					min_dims: $crate::__op_opt!($({$min})?, 0),
					max_dims: $crate::__op_opt!($({$max})?, usize::MAX),
				},
				signature: $sig,
				factory: $factory,
			};

			$crate::__private::inventory::submit! { $crate::OpReg(&[<OP_ $ident:upper>]) }
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __op_opt {
	(, $default:expr) => {
		$default
	};
	({$value:expr}, $default:expr) => {
		$value
	};
}
