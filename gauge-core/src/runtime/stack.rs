use super::error::ErrorMessage;
use super::value::Value;

/// 值栈：`Assign` 压栈，块退出时截断
#[derive(Debug)]
pub struct Stack {
    values: Vec<Value>,
    limit: usize,
}

impl Stack {
    pub fn new(limit: usize) -> Self {
        Self {
            values: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, value: Value) -> Result<(), ErrorMessage> {
        if self.values.len() >= self.limit {
            return Err(ErrorMessage::StackOverflow(self.limit));
        }
        self.values.push(value);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 恢复到之前记录的大小
    pub fn shrink_to(&mut self, size: usize) {
        self.values.truncate(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_shrink() {
        let mut stack = Stack::new(8);
        stack.push(Value::Number(1.0)).unwrap();
        stack.push(Value::Number(2.0)).unwrap();
        assert_eq!(stack.get(1), Some(&Value::Number(2.0)));
        stack.shrink_to(1);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.get(1), None);
    }

    #[test]
    fn test_limit() {
        let mut stack = Stack::new(1);
        stack.push(Value::Void).unwrap();
        assert_eq!(stack.push(Value::Void), Err(ErrorMessage::StackOverflow(1)));
    }
}
