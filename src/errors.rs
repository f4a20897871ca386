// Generated error types; the macro output is not documented item by item.
#![allow(missing_docs, deprecated)]

error_chain! {
    foreign_links {
        Utf8(::std::str::Utf8Error);
    }

    errors {
        ZeroValue {
            description("0 is reserved as the absent marker")
            display("cannot store 0: it is reserved as the absent marker")
        }

        EmptyKey {
            description("the empty key cannot be stored")
            display("cannot store the empty key: the root is never a leaf")
        }

        CapacityExceeded(required: usize, capacity: usize) {
            description("completion does not fit in the buffer")
            display("completion needs {} bytes but the buffer holds at most {}", required, capacity)
        }
    }
}
