//! `define_port_error!` generates port error enums with `thiserror` messages
//! and snake-case constructors that accept `impl Into<_>` arguments.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum SamplePortError {
            Unavailable { message: String } => "unavailable: {message}",
            Missing { id: uuid::Uuid } => "missing: {id}",
            Exhausted => "exhausted",
        }
    }

    #[rstest]
    fn string_fields_accept_str() {
        let err = SamplePortError::unavailable("pool closed");
        assert_eq!(err.to_string(), "unavailable: pool closed");
    }

    #[rstest]
    fn non_string_fields_keep_their_type() {
        let id = uuid::Uuid::nil();
        let err = SamplePortError::missing(id);
        assert_eq!(err, SamplePortError::Missing { id });
    }

    #[rstest]
    fn unit_variants_get_constructors() {
        assert_eq!(SamplePortError::exhausted().to_string(), "exhausted");
    }
}
