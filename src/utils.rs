/// This let use collect an iterator of result into a result of vectors.
///
/// The generic signature, assuming `I: FromIterator` would look like `Iterator<Result<T, E>> -> Result<I<T>, I<E>>`.
/// Unlike `collect::<Result<Vec<_>, _>>()`, every error is kept instead of stopping at the first one.
pub fn collect_accumulate<T, E, I>(iterator: I) -> Result<Vec<T>, Vec<E>>
where
    I: Iterator<Item = Result<T, E>>,
{
    let mut items = vec![];
    let mut errors = vec![];

    for i in iterator {
        match i {
            Ok(t) => items.push(t),
            Err(e) => errors.push(e),
        };
    }

    if errors.is_empty() {
        Ok(items)
    } else {
        Err(errors)
    }
}
