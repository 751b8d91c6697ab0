pub trait SFold<T> {
    fn sfold_result<A, E>(
        &self,
        acc: Result<A, E>,
        f: impl Fn(A, &T) -> Result<A, E>
    ) -> Result<A, E> where Self: Sized;

    fn sfold<A>(&self, acc: A, f: impl Fn(A, &T) -> A) -> A where Self: Sized {
        self.sfold_result(Ok(acc), |acc, t| Ok::<A, ()>(f(acc, t)))
            .unwrap_or_else(|_| unreachable!())
    }
}

impl<T> SFold<T> for Vec<T> {
    fn sfold_result<A, E>(
        &self,
        acc: Result<A, E>,
        f: impl Fn(A, &T) -> Result<A, E>
    ) -> Result<A, E> {
        self.iter().fold(acc, |acc, t| f(acc?, t))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fold_vec_in_order() {
        let v = vec![1, 2, 3];
        let s = v.sfold(String::new(), |acc, x| format!("{acc}{x}"));
        assert_eq!(s, "123");
    }

    #[test]
    fn fold_result_stops_at_first_error() {
        let v = vec![1, 2, 3];
        let r = v.sfold_result(Ok(0), |acc, x| if *x == 2 { Err(*x) } else { Ok(acc + x) });
        assert_eq!(r, Err(2));
    }
}
