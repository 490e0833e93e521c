//! Helper macro for declaring port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! parameters accept anything convertible into the field type, so adapters can
//! write `DocumentStoreError::query("boom")` instead of spelling out
//! `String::from`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_fields $variant [] [] $( $field : $ty, )*);
    };

    (@ctor_fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_fields
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
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
    define_port_error! {
        pub enum SamplePortError {
            Offline => "backend offline",
            Rejected { reason: String } => "rejected: {reason}",
            Throttled { retry_after: u64 } => "retry in {retry_after}s",
            Partial { reason: String, applied: usize } => "{reason} after {applied} writes",
        }
    }

    #[test]
    fn unit_variant_gets_a_nullary_constructor() {
        assert_eq!(SamplePortError::offline(), SamplePortError::Offline);
        assert_eq!(SamplePortError::offline().to_string(), "backend offline");
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = SamplePortError::rejected("duplicate");
        assert_eq!(err.to_string(), "rejected: duplicate");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = SamplePortError::throttled(30_u64);
        assert_eq!(err, SamplePortError::Throttled { retry_after: 30 });
    }

    #[test]
    fn mixed_fields_render_in_order() {
        let err = SamplePortError::partial("timeout", 1_usize);
        assert_eq!(err.to_string(), "timeout after 1 writes");
    }
}
