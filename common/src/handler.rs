//! [`Handler`] abstractions.

use std::future::Future;

/// Asynchronous handler of `Args`.
///
/// Commands, queries and storage operations are all expressed as
/// [`Handler`]s parametrized by the operation they accept, so a single type
/// may handle many different operations.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}

impl<H, Args> Handler<Args> for &H
where
    H: Handler<Args> + ?Sized,
{
    type Ok = H::Ok;
    type Err = H::Err;

    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>> {
        (**self).execute(args)
    }
}

#[cfg(test)]
mod spec {
    use std::{convert::Infallible, future};

    use futures::executor::block_on;

    use super::Handler;

    struct Double;

    impl Handler<u32> for Double {
        type Ok = u32;
        type Err = Infallible;

        async fn execute(&self, args: u32) -> Result<u32, Infallible> {
            future::ready(Ok(args * 2)).await
        }
    }

    async fn run<H: Handler<u32, Ok = u32>>(h: H) -> Option<u32> {
        h.execute(21).await.ok()
    }

    #[test]
    fn reference_delegates_to_handler() {
        let handler = Double;

        assert_eq!(block_on(run(&handler)), Some(42));
        assert_eq!(block_on(run(&&handler)), Some(42));
    }
}
